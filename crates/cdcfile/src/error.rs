//! Error types for cdcfile.

use thiserror::Error;

/// Failure of a single `get_file` call.
///
/// "Not found" is never an error; it is the `Ok(None)` outcome.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("metadata lookup failed: {0}")]
    Catalog(#[from] cdcfile_catalog::CatalogError),

    #[error("blob fetch failed: {0}")]
    Storage(#[from] cdcfile_storage::StorageError),

    #[error("failed to build archive: {0}")]
    Archive(#[from] cdcfile_archive::Error),

    #[error("request cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ManagerError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self { ConfigError::Figment(Box::new(e)) }
}
