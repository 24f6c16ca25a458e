use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Classification of stored files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileCategory {
    Report,
    SitePlan,
}

impl FileCategory {
    pub const ALL: [FileCategory; 2] = [FileCategory::Report, FileCategory::SitePlan];

    /// Numeric id the metadata catalog stores for this category.
    pub const fn id(self) -> u8 {
        match self {
            Self::Report => 1,
            Self::SitePlan => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> { Self::ALL.into_iter().find(|c| c.id() == id) }

    /// Query-string form, e.g. `site-plan`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::SitePlan => "site-plan",
        }
    }
}

impl FromStr for FileCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
