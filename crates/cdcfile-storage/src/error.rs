//! Error types for cdcfile-storage.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported location scheme '{scheme}' for '{location}'")]
    UnsupportedScheme { scheme: String, location: String },

    #[error("location '{location}' resolves outside the storage root")]
    OutsideRoot { location: String },

    #[error("failed to read '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("storage returned HTTP {status} for '{location}'")]
    HttpStatus { location: String, status: u16 },

    #[error("transport error fetching '{location}': {source}")]
    Transport {
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;
