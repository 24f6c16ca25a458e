use std::future::Future;
use std::sync::Arc;

use cdcfile_model::{FileRecord, LocationRecord};

use crate::error::Result;

/// Fetch the bytes behind a location.
///
/// # Returns
///
/// `Ok(Some(file))` with content type and file name set, `Ok(None)` when
/// nothing exists at the location, `Err(...)` for transport or protocol
/// failures.
pub trait BlobFetcher: Send + Sync {
    fn fetch(
        &self,
        location: &LocationRecord,
    ) -> impl Future<Output = Result<Option<FileRecord>>> + Send;
}

impl<T: BlobFetcher> BlobFetcher for Arc<T> {
    fn fetch(
        &self,
        location: &LocationRecord,
    ) -> impl Future<Output = Result<Option<FileRecord>>> + Send {
        (**self).fetch(location)
    }
}

/// Name to give a file fetched from `location`.
pub(crate) fn file_name_for(location: &LocationRecord) -> String {
    location.file_name().unwrap_or_else(|| "file".to_string())
}
