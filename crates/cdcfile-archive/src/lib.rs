//! Deterministic in-memory zip bundles of fetched files.
//!
//! # Architecture
//!
//! - `build.rs` - Archive construction (flat and urn-grouped layouts)
//! - `read.rs` - Re-opening a built archive
//! - `sanitize.rs` - Entry name safety and collision handling
//! - `options.rs` - Layout and compression options

pub use build::{build_archive, build_flat_archive, build_grouped_archive};
pub use error::{Error, Result};
pub use options::{ArchiveLayout, ArchiveOptions, Compression};
pub use read::{ArchivedEntry, read_archive};
pub use sanitize::{EntryNamer, sanitize_entry_name};

/// Folder (and archive stem) name for an urn's files, e.g. `1234 files`.
pub fn group_folder_name(urn: cdcfile_model::Urn) -> String { format!("{urn} files") }

/// Name given to every bundle built for `urn`, e.g. `1234 files.zip`.
pub fn archive_file_name(urn: cdcfile_model::Urn) -> String { format!("{urn} files.zip") }

mod build;
mod error;
pub mod options;
mod read;
mod sanitize;
