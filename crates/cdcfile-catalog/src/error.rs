use std::io;
use std::path::PathBuf;

use cdcfile_model::Urn;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read manifest '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse manifest '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid file location for urn {urn}: {source}")]
    InvalidLocation {
        urn: Urn,
        source: cdcfile_model::Error,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
