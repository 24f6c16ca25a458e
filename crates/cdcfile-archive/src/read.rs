use std::io::{Cursor, Read};

use bytes::Bytes;

use crate::error::{Error, Result};

/// A file entry read back out of an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivedEntry {
    pub name: String,
    pub content: Bytes,
}

/// Re-open an archive and return its file entries in archive order.
///
/// Directory entries are skipped.
pub fn read_archive(data: &[u8]) -> Result<Vec<ArchivedEntry>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|_| Error::Corrupted)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(|_| Error::Corrupted)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut content).map_err(|_| Error::Corrupted)?;
        entries.push(ArchivedEntry {
            name,
            content: Bytes::from(content),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_corrupted() {
        assert!(matches!(read_archive(b"not a zip"), Err(Error::Corrupted)));
        assert!(matches!(read_archive(&[]), Err(Error::Corrupted)));
    }

    #[test]
    fn truncated_archive_is_corrupted() {
        let file = cdcfile_model::FileRecord::new("text/plain", b"hello".to_vec()).with_file_name("a.txt");
        let archive = crate::build_flat_archive(cdcfile_model::Urn::new(1), &[file]).unwrap();
        let truncated = &archive.content_bytes()[..archive.len() / 2];
        assert!(read_archive(truncated).is_err());
    }
}
