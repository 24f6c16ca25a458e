use std::fmt;

use bytes::Bytes;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// A fetched file, held entirely in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    content_type: String,
    content_bytes: Bytes,
    file_name: Option<String>,
}

impl FileRecord {
    /// An empty content type is replaced with [`DEFAULT_CONTENT_TYPE`].
    pub fn new(content_type: impl Into<String>, content_bytes: impl Into<Bytes>) -> Self {
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type
        };
        Self {
            content_type,
            content_bytes: content_bytes.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn content_type(&self) -> &str { &self.content_type }

    pub fn content_bytes(&self) -> &Bytes { &self.content_bytes }

    pub fn file_name(&self) -> Option<&str> { self.file_name.as_deref() }

    pub fn len(&self) -> usize { self.content_bytes.len() }

    pub fn is_empty(&self) -> bool { self.content_bytes.is_empty() }

    pub fn is_zip(&self) -> bool { self.content_type == ZIP_CONTENT_TYPE }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} bytes)",
            self.file_name.as_deref().unwrap_or("<unnamed>"),
            self.content_type,
            self.content_bytes.len()
        )
    }
}
