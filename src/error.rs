//! Crate-wide error type.
//!
//! Every failure is raised at the boundary of the operation that triggered it
//! and propagated with `?` up to `app::run`. The binary maps each variant to a
//! process exit code.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// No usable input was supplied (no file, no query, no manual rows),
    /// or the supplied file has a format we cannot read.
    #[error("No usable input: {0}")]
    SourceUnavailable(String),

    /// Required columns are absent. Lists every missing column.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A value could not be normalized to a number.
    #[error("Column '{column}', row {row}: '{value}' is not a number")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },

    /// The margin regression cannot be trained on the given record set.
    #[error("Cannot train margin model: {0}")]
    Fitting(String),

    /// File, database or export failure.
    #[error("{0}")]
    Io(String),

    /// Invalid command-line or environment settings.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn schema(missing: impl IntoIterator<Item = impl Into<String>>) -> Self {
        AppError::Schema {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::SourceUnavailable(_) | AppError::Schema { .. } | AppError::Config(_) => 2,
            AppError::Parse { .. } => 3,
            AppError::Fitting(_) => 4,
            AppError::Io(_) => 5,
        }
    }
}
