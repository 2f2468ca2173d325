//! Client offer document.
//!
//! The offer is a Markdown document (client name, dates, purchased volumes per
//! product, contact block) written to `<output_dir>/<client>_nabidka.md`.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::AllocationTable;
use crate::error::AppError;

const CONTACT: [&str; 5] = [
    "**Kontakt:**",
    "Smart Energies",
    "Tel: 606 240 891",
    "Email: info@smartenergies.cz",
    "Web: www.smartenergies.cz",
];

const VALIDITY_NOTE: &str =
    "_Tato nabídka je platná do uvedeného data nebo do vyprodání kapacity obchodníka._";

/// Everything that goes into one offer.
#[derive(Debug, Clone)]
pub struct Offer<'a> {
    pub client: &'a str,
    pub generated: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub table: &'a AllocationTable,
}

/// Render the offer as Markdown.
pub fn render_offer(offer: &Offer<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Cenová nabídka pro: {}\n\n", offer.client));
    let validity = offer
        .valid_until
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| "neuvedeno".to_string());
    out.push_str(&format!(
        "Vygenerováno: {} | Platnost nabídky do: {}\n\n",
        offer.generated.format("%d.%m.%Y"),
        validity
    ));

    out.push_str("| Produkt | Objem [MWh] |\n");
    out.push_str("| :---: | :---: |\n");
    for row in &offer.table.rows {
        out.push_str(&format!("| {} | {:.2} |\n", row.product, row.volume_mwh));
    }
    out.push('\n');

    out.push_str(&CONTACT.join("  \n"));
    out.push_str("\n\n");
    out.push_str(VALIDITY_NOTE);
    out.push('\n');

    out
}

/// Write the offer into `dir`, creating it if needed. Returns the file path.
pub fn write_offer(dir: &Path, offer: &Offer<'_>) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::Io(format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let path = dir.join(format!("{}_nabidka.md", file_stem(offer.client)));
    let mut file = File::create(&path)
        .map_err(|e| AppError::Io(format!("Failed to create offer '{}': {e}", path.display())))?;
    file.write_all(render_offer(offer).as_bytes())
        .map_err(|e| AppError::Io(format!("Failed to write offer: {e}")))?;

    info!(path = %path.display(), client = offer.client, "offer written");
    Ok(path)
}

/// Client name made safe for a file name.
fn file_stem(client: &str) -> String {
    let stem: String = client
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "klient".to_string() } else { stem }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllocationRow, Product};

    fn table() -> AllocationTable {
        AllocationTable {
            rows: Product::ALL
                .iter()
                .map(|&product| AllocationRow {
                    product,
                    volume_mwh: if product == Product::Spot { 12.5 } else { 0.0 },
                })
                .collect(),
        }
    }

    #[test]
    fn offer_contains_header_table_and_contacts() {
        let table = table();
        let offer = Offer {
            client: "Pivovar Hradec",
            generated: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2025, 6, 15),
            table: &table,
        };
        let text = render_offer(&offer);

        assert!(text.starts_with("# Cenová nabídka pro: Pivovar Hradec"));
        assert!(text.contains("Vygenerováno: 01.06.2025 | Platnost nabídky do: 15.06.2025"));
        assert!(text.contains("| CAL | 0.00 |"));
        assert!(text.contains("| SPOT | 12.50 |"));
        assert!(text.contains("info@smartenergies.cz"));
        assert!(text.trim_end().ends_with(VALIDITY_NOTE));
    }

    #[test]
    fn offer_file_is_keyed_by_client() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("outputs");
        let table = table();
        let offer = Offer {
            client: "ACME s.r.o.",
            generated: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            valid_until: None,
            table: &table,
        };
        let path = write_offer(&out_dir, &offer).unwrap();

        assert_eq!(path.file_name().unwrap(), "ACME_s_r_o__nabidka.md");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Platnost nabídky do: neuvedeno"));
    }
}
