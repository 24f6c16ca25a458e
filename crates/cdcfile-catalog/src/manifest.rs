use std::path::{Path, PathBuf};
use std::sync::Arc;

use cdcfile_model::{FileCategory, LocationRecord, Urn};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::resolver::MetadataResolver;

/// One row of the file list: a file recorded against an urn during a visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub urn: Urn,
    pub type_id: u8,
    pub site_visit_date: NaiveDate,
    /// Folder the file lives in.
    pub file_url: String,
    pub file_name: String,
}

enum Source {
    Rows(Arc<Vec<CatalogRow>>),
    File(PathBuf),
}

/// Resolver backed by a JSON array of [`CatalogRow`]s.
///
/// A file-backed manifest is re-read on every lookup, so edits are visible
/// to the next request without a restart.
pub struct ManifestResolver {
    source: Source,
}

impl ManifestResolver {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self {
            source: Source::Rows(Arc::new(rows)),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    /// Read and parse the manifest at `path`.
    pub async fn load(path: &Path) -> Result<Vec<CatalogRow>> {
        let raw = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl MetadataResolver for ManifestResolver {
    async fn resolve(&self, urn: Urn, category: FileCategory) -> Result<Vec<LocationRecord>> {
        tracing::debug!(%urn, %category, "pulling back file list");

        let rows = match &self.source {
            Source::Rows(rows) => Arc::clone(rows),
            Source::File(path) => Arc::new(Self::load(path).await?),
        };

        let locations = select_latest_visit(&rows, urn, category)?;
        if locations.is_empty() {
            tracing::info!(%urn, %category, "no records found");
        } else {
            tracing::info!(%urn, %category, results = locations.len(), "file list returned");
        }
        Ok(locations)
    }
}

/// Locations of `urn`'s `category` files from its most recent site visit.
///
/// Rows from earlier visits are ignored. Manifest order is kept among the
/// rows that survive.
pub fn select_latest_visit(
    rows: &[CatalogRow],
    urn: Urn,
    category: FileCategory,
) -> Result<Vec<LocationRecord>> {
    let matching: Vec<&CatalogRow> = rows
        .iter()
        .filter(|row| row.urn == urn && row.type_id == category.id())
        .collect();

    let Some(latest) = matching.iter().map(|row| row.site_visit_date).max() else {
        return Ok(Vec::new());
    };

    matching
        .into_iter()
        .filter(|row| row.site_visit_date == latest)
        .map(|row| {
            LocationRecord::join(&row.file_url, &row.file_name)
                .map_err(|source| CatalogError::InvalidLocation { urn, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(urn: u32, type_id: u8, date: &str, name: &str) -> CatalogRow {
        CatalogRow {
            urn: Urn::new(urn),
            type_id,
            site_visit_date: date.parse().unwrap(),
            file_url: format!("https://files.example/share/{urn}/"),
            file_name: name.to_string(),
        }
    }

    #[test]
    fn keeps_only_most_recent_visit() {
        let rows = vec![
            row(1, 1, "2018-03-01", "old.pdf"),
            row(1, 1, "2020-06-15", "new-a.pdf"),
            row(1, 1, "2019-01-01", "mid.pdf"),
            row(1, 1, "2020-06-15", "new-b.pdf"),
        ];
        let locations = select_latest_visit(&rows, Urn::new(1), FileCategory::Report).unwrap();
        let names: Vec<_> = locations.iter().filter_map(|l| l.file_name()).collect();
        assert_eq!(names, vec!["new-a.pdf", "new-b.pdf"]);
    }

    #[test]
    fn filters_by_urn_and_category() {
        let rows = vec![
            row(1, 1, "2020-01-01", "report.pdf"),
            row(1, 2, "2021-01-01", "plan.pdf"),
            row(2, 1, "2022-01-01", "other.pdf"),
        ];
        let locations = select_latest_visit(&rows, Urn::new(1), FileCategory::Report).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].to_string(), "https://files.example/share/1/report.pdf");
    }

    #[test]
    fn no_match_is_empty() {
        let rows = vec![row(1, 1, "2020-01-01", "report.pdf")];
        assert!(select_latest_visit(&rows, Urn::new(9), FileCategory::Report).unwrap().is_empty());
        assert!(select_latest_visit(&[], Urn::new(1), FileCategory::SitePlan).unwrap().is_empty());
    }

    #[test]
    fn relative_base_is_invalid() {
        let mut bad = row(1, 1, "2020-01-01", "report.pdf");
        bad.file_url = "share/1/".to_string();
        assert!(matches!(
            select_latest_visit(&[bad], Urn::new(1), FileCategory::Report),
            Err(CatalogError::InvalidLocation { .. })
        ));
    }

    #[tokio::test]
    async fn in_memory_resolver() {
        let resolver = ManifestResolver::new(vec![row(5, 2, "2020-01-01", "plan.pdf")]);
        let locations = resolver.resolve(Urn::new(5), FileCategory::SitePlan).await.unwrap();
        assert_eq!(locations.len(), 1);
    }
}
