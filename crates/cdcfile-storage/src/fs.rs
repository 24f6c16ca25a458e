use std::io;
use std::path::{Path, PathBuf};

use cdcfile_model::{DEFAULT_CONTENT_TYPE, FileRecord, LocationRecord};

use crate::error::{Result, StorageError};
use crate::fetcher::{BlobFetcher, file_name_for};

/// Serves `file://` locations from a file share mounted at `root`.
#[derive(Clone, Debug)]
pub struct FsBlobFetcher {
    root: PathBuf,
}

impl FsBlobFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    fn local_path(&self, location: &LocationRecord) -> Result<PathBuf> {
        if location.scheme() != "file" {
            return Err(StorageError::UnsupportedScheme {
                scheme: location.scheme().to_string(),
                location: location.to_string(),
            });
        }
        location.url().to_file_path().map_err(|()| StorageError::OutsideRoot {
            location: location.to_string(),
        })
    }
}

impl BlobFetcher for FsBlobFetcher {
    async fn fetch(&self, location: &LocationRecord) -> Result<Option<FileRecord>> {
        let path = self.local_path(location)?;
        let io_error = |source: io::Error| StorageError::Io {
            location: location.to_string(),
            source,
        };

        tracing::debug!(%location, "checking file share for file");

        let resolved = match tokio::fs::canonicalize(&path).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(%location, "file does not exist");
                return Ok(None);
            }
            Err(e) => return Err(io_error(e)),
        };
        let root = tokio::fs::canonicalize(&self.root).await.map_err(io_error)?;
        if !resolved.starts_with(&root) {
            return Err(StorageError::OutsideRoot {
                location: location.to_string(),
            });
        }

        let metadata = tokio::fs::metadata(&resolved).await.map_err(io_error)?;
        if !metadata.is_file() {
            tracing::warn!(%location, "location is not a regular file");
            return Ok(None);
        }

        let content = match tokio::fs::read(&resolved).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };

        let file_name = file_name_for(location);
        let file = FileRecord::new(content_type_for(&file_name), content).with_file_name(file_name);
        tracing::info!(%location, %file, "downloaded from file share");
        Ok(Some(file))
    }
}

/// Content type implied by a file name's extension.
///
/// File shares rarely carry a reliable content type, so the extension is the
/// best signal available; unknown extensions get [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(file_name: &str) -> &'static str {
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "zip" => "application/zip",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
