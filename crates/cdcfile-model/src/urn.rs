use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Establishment identifier used to group files.
///
/// Despite the name this is not a URI; it is the integer key the metadata
/// catalog is indexed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(u32);

impl Urn {
    pub const fn new(value: u32) -> Self { Self(value) }

    pub const fn get(self) -> u32 { self.0 }

    /// Parse a comma separated list such as `"1, 2,3"`.
    ///
    /// Every item must be a valid urn; an empty item is rejected rather than
    /// skipped.
    pub fn parse_list(raw: &str) -> Result<Vec<Urn>> {
        raw.split(',').map(|item| item.trim().parse()).collect()
    }
}

impl FromStr for Urn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidUrn(s.to_string()));
        }
        trimmed
            .parse::<u32>()
            .map(Self)
            .map_err(|_| Error::InvalidUrn(s.to_string()))
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<u32> for Urn {
    fn from(value: u32) -> Self { Self(value) }
}
