#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid urn '{0}'")]
    InvalidUrn(String),

    #[error("unknown file category '{0}'")]
    UnknownCategory(String),

    #[error("invalid location '{location}': {source}")]
    InvalidLocation {
        location: String,
        source: url::ParseError,
    },

    #[error("location is not an absolute uri: '{0}'")]
    RelativeLocation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
