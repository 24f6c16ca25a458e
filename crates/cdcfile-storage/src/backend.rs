use cdcfile_model::{FileRecord, LocationRecord};

use crate::error::Result;
use crate::fetcher::BlobFetcher;
use crate::fs::FsBlobFetcher;

#[cfg(feature = "reqwest")]
use crate::http::{HttpBlobFetcher, ReqwestClient};

/// Storage style chosen at startup.
pub enum StorageBackend {
    /// Hierarchical file share mounted locally.
    FileShare(FsBlobFetcher),
    /// Flat blob container reached over HTTP.
    #[cfg(feature = "reqwest")]
    BlobContainer(HttpBlobFetcher<ReqwestClient>),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileShare(_) => "file-share",
            #[cfg(feature = "reqwest")]
            Self::BlobContainer(_) => "blob-container",
        }
    }
}

impl BlobFetcher for StorageBackend {
    async fn fetch(&self, location: &LocationRecord) -> Result<Option<FileRecord>> {
        match self {
            Self::FileShare(fetcher) => fetcher.fetch(location).await,
            #[cfg(feature = "reqwest")]
            Self::BlobContainer(fetcher) => fetcher.fetch(location).await,
        }
    }
}
