use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Absolute URI of a file in storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRecord {
    location: Url,
}

impl LocationRecord {
    pub fn new(location: Url) -> Self { Self { location } }

    pub fn parse(raw: &str) -> Result<Self> {
        match Url::parse(raw) {
            Ok(location) => Ok(Self { location }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Err(Error::RelativeLocation(raw.to_string()))
            }
            Err(source) => Err(Error::InvalidLocation {
                location: raw.to_string(),
                source,
            }),
        }
    }

    /// Resolve `file_name` against `base`, following URL join rules.
    pub fn join(base: &str, file_name: &str) -> Result<Self> {
        let base = Self::parse(base)?;
        let location = base
            .location
            .join(file_name)
            .map_err(|source| Error::InvalidLocation {
                location: format!("{base}{file_name}"),
                source,
            })?;
        Ok(Self { location })
    }

    pub fn url(&self) -> &Url { &self.location }

    pub fn scheme(&self) -> &str { self.location.scheme() }

    /// Percent-decoded last path segment, if non-empty.
    pub fn file_name(&self) -> Option<String> {
        let segment = self.location.path_segments()?.next_back()?;
        if segment.is_empty() {
            return None;
        }
        Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
    }
}

impl FromStr for LocationRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.location) }
}
