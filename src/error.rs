//! Error types for the catalogue pipeline
//!
//! Only problems that stop a catalogue from being produced at all are errors.
//! Everything the loader can work around is recorded as a
//! [`Diagnostic`](crate::diagnostics::Diagnostic) instead.

use thiserror::Error;

/// Result type for catalogue operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalogue errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Expected to load {expected:?} but got {found:?}")]
    Structure { expected: String, found: String },

    #[error("Invalid schema descriptor: {0}")]
    InvalidSchema(String),

    #[error("No catalogue has been loaded yet")]
    NotLoaded,

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Dataset cache error: {0}")]
    Cache(String),
}

impl CatalogError {
    /// True for the one error kind that means the document itself has the wrong shape.
    pub fn is_structure(&self) -> bool {
        matches!(self, CatalogError::Structure { .. })
    }
}
