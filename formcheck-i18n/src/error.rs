//! Error types for catalog operations

use thiserror::Error;

/// Errors that can occur while building or parsing catalogs.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Invalid language tag
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Catalog data has the wrong shape
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}
