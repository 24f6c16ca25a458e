//! Blob fetching from file shares and blob containers.
//!
//! # Architecture
//!
//! - [`BlobFetcher`] - the capability the file manager consumes
//! - [`FsBlobFetcher`] - hierarchical file share mounted on local disk
//! - [`HttpBlobFetcher`] - flat blob container reached over HTTP
//! - [`StorageBackend`] - runtime choice between the two
//!
//! "Not found" is `Ok(None)`; anything else that goes wrong is an error.

mod backend;
mod error;
mod fetcher;
mod fs;
mod http;

pub use backend::StorageBackend;
pub use error::{Result, StorageError};
pub use fetcher::BlobFetcher;
pub use fs::{FsBlobFetcher, content_type_for};
pub use http::{HttpBlobFetcher, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
