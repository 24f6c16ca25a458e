use std::future::Future;
use std::sync::Arc;

use cdcfile_model::{FileCategory, LocationRecord, Urn};

use crate::error::Result;

/// Look up where an urn's files of one category live.
///
/// Returns an empty list, never an error, when nothing matches.
pub trait MetadataResolver: Send + Sync {
    fn resolve(
        &self,
        urn: Urn,
        category: FileCategory,
    ) -> impl Future<Output = Result<Vec<LocationRecord>>> + Send;
}

impl<T: MetadataResolver> MetadataResolver for Arc<T> {
    fn resolve(
        &self,
        urn: Urn,
        category: FileCategory,
    ) -> impl Future<Output = Result<Vec<LocationRecord>>> + Send {
        (**self).resolve(urn, category)
    }
}
