//! File metadata lookup for the cdcfile gateway.
//!
//! A [`MetadataResolver`] turns an urn and a category into the storage
//! locations of the matching files. [`ManifestResolver`] answers from a JSON
//! manifest shaped like the `GetFileList` result set.

mod error;
mod manifest;
mod resolver;

pub use error::{CatalogError, Result};
pub use manifest::{CatalogRow, ManifestResolver, select_latest_visit};
pub use resolver::MetadataResolver;
