//! Error taxonomy for the ingestion and search pipeline.
//!
//! Only [`CatalogError::ReloadFailure`] ever reaches a caller as a hard
//! error. The other variants are recovered where they occur and surface as
//! warnings on ingestion outcomes or as `Err` values that the caller
//! inspects and logs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// A single source could not be read (I/O, malformed data, timeout).
    #[error("source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A canonical column was absent from a source; values default to "".
    #[error("source '{source_name}' has no column for '{column}'")]
    SchemaMismatch { source_name: String, column: String },

    /// A price string could not be read as a number.
    #[error("price '{raw}' is not a number")]
    PriceUnparsable { raw: String },

    /// A full snapshot rebuild failed; the previous snapshot stays live.
    #[error("catalog reload failed: {reason}")]
    ReloadFailure { reason: String },
}

impl CatalogError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        CatalogError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        CatalogError::ReloadFailure {
            reason: reason.into(),
        }
    }
}
