//! File, location and identifier types for the cdcfile gateway.
//!
//! # Architecture
//!
//! - `urn.rs` - Establishment identifier
//! - `category.rs` - Closed set of file categories
//! - `file.rs` - Fetched file content
//! - `location.rs` - Where a file lives in storage
//! - `groups.rs` - Ordered identifier to files mapping

pub use category::FileCategory;
pub use error::{Error, Result};
pub use file::{DEFAULT_CONTENT_TYPE, FileRecord, ZIP_CONTENT_TYPE};
pub use groups::UrnGroups;
pub use location::LocationRecord;
pub use urn::Urn;

mod category;
mod error;
mod file;
mod groups;
mod location;
mod urn;
