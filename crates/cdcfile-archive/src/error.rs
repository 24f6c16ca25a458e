use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("refusing to build an archive with no files")]
    EmptyArchive,

    #[error("failed to write archive entry '{entry}': {source}")]
    EntryFailed {
        entry: String,
        source: zip::result::ZipError,
    },

    #[error("archive is corrupted")]
    Corrupted,

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
