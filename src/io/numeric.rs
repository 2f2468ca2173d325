//! Decimal normalization shared by both loaders.
//!
//! Exports from Czech tooling routinely use a comma decimal separator and
//! space (or non-breaking space) thousands grouping, e.g. `1 234,5`.

/// Replace `,` with `.` and drop every whitespace character.
pub fn normalize_decimal(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Parse a decimal after normalization. Non-finite values are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let v = normalize_decimal(raw).parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse an integer year, accepting spreadsheet renderings such as `2023.0`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = normalize_decimal(raw);
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < f64::from(i32::MAX) {
        Some(v as i32)
    } else {
        None
    }
}
