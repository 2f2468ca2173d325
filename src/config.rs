//! Environment settings.
//!
//! Read once per run, after loading `.env` (if any) via `dotenvy`:
//!
//! - `DESK_DATABASE_URL`: default SQLite database for `desk margin --query`
//! - `DESK_OUTPUT_DIR`: directory for offer documents (default `outputs`)
//!
//! CLI flags always take precedence over these values.

use std::path::PathBuf;

pub const DATABASE_URL_VAR: &str = "DESK_DATABASE_URL";
pub const OUTPUT_DIR_VAR: &str = "DESK_OUTPUT_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: Option<String>,
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            database_url: get(DATABASE_URL_VAR),
            output_dir: get(OUTPUT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
