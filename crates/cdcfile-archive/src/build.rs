use std::io::{Cursor, Write};

use cdcfile_model::{FileRecord, Urn, UrnGroups, ZIP_CONTENT_TYPE};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};
use crate::options::{ArchiveLayout, ArchiveOptions, Compression};
use crate::sanitize::EntryNamer;
use crate::{archive_file_name, group_folder_name};

/// Bundle `files` at the archive root, named `"{urn} files.zip"`.
pub fn build_flat_archive(urn: Urn, files: &[FileRecord]) -> Result<FileRecord> {
    let mut groups = UrnGroups::new();
    groups.insert(urn, files.to_vec());
    build_archive(urn, &groups, ArchiveOptions::default().layout(ArchiveLayout::Flat))
}

/// Bundle every group under its own `"{urn} files/"` folder, named after
/// `primary`.
pub fn build_grouped_archive(primary: Urn, groups: &UrnGroups) -> Result<FileRecord> {
    build_archive(primary, groups, ArchiveOptions::default().layout(ArchiveLayout::Grouped))
}

/// Serialize `groups` into one zip held in memory.
///
/// Entries are written in group order, then file order. Every entry carries
/// the DOS epoch as its timestamp, so equal input gives equal bytes.
pub fn build_archive(primary: Urn, groups: &UrnGroups, options: ArchiveOptions) -> Result<FileRecord> {
    if groups.is_empty() {
        return Err(Error::EmptyArchive);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut namer = EntryNamer::new();

    for (urn, files) in groups.iter() {
        let folder = match options.layout {
            ArchiveLayout::Flat => None,
            ArchiveLayout::Grouped => Some(group_folder_name(urn)),
        };

        for file in files {
            let entry = namer.next_name(folder.as_deref(), file.file_name());
            writer
                .start_file(entry.as_str(), entry_options(options.compression))
                .map_err(|source| Error::EntryFailed {
                    entry: entry.clone(),
                    source,
                })?;
            writer.write_all(file.content_bytes())?;

            tracing::debug!(%entry, bytes = file.len(), "added entry to archive");
        }
    }

    let content = writer.finish()?.into_inner();
    let archive = FileRecord::new(ZIP_CONTENT_TYPE, content).with_file_name(archive_file_name(primary));

    tracing::info!(
        %archive,
        groups = groups.group_count(),
        entries = groups.file_count(),
        "archive generated"
    );

    Ok(archive)
}

fn entry_options(compression: Compression) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(compression.method())
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644)
}
