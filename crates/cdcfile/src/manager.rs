use std::future::Future;

use cdcfile_archive::{build_flat_archive, build_grouped_archive};
use cdcfile_catalog::MetadataResolver;
use cdcfile_model::{FileCategory, FileRecord, LocationRecord, Urn, UrnGroups};
use cdcfile_storage::BlobFetcher;
use futures_util::StreamExt;
use futures_util::stream::FuturesOrdered;
use tokio_util::sync::CancellationToken;

use crate::error::{ManagerError, Result};

/// Resolves, fetches and, when needed, bundles an urn's files.
///
/// Stateless between calls: every call resolves metadata afresh and nothing
/// fetched is kept once the call returns.
pub struct FileManager<R, F> {
    resolver: R,
    fetcher: F,
    fetch_concurrency: usize,
}

impl<R, F> FileManager<R, F>
where
    R: MetadataResolver,
    F: BlobFetcher,
{
    pub fn new(resolver: R, fetcher: F) -> Self {
        Self {
            resolver,
            fetcher,
            fetch_concurrency: 1,
        }
    }

    /// Fetch up to `n` blobs of one urn at once. Results keep metadata order
    /// regardless. Values below 1 are treated as 1.
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    pub fn resolver(&self) -> &R { &self.resolver }

    pub fn fetcher(&self) -> &F { &self.fetcher }

    /// Get the file (or bundle of files) stored for `urn`.
    ///
    /// - One file: returned as-is.
    /// - Several files: zipped flat into `"{urn} files.zip"`.
    /// - No files: each of `fallback_urns` is tried in order, and everything
    ///   found is zipped into `"{urn} files.zip"` with one `"{fallback} files/"`
    ///   folder per fallback urn, even if only one file turned up.
    ///
    /// `Ok(None)` means nothing was found anywhere. Collaborator failures are
    /// returned as errors and never trigger the fallback path.
    ///
    /// # Errors
    ///
    /// [`ManagerError::Cancelled`] if `cancel` fires before the result is
    /// ready; no partial result is produced in that case.
    pub async fn get_file(
        &self,
        urn: Urn,
        category: FileCategory,
        fallback_urns: Option<&[Urn]>,
        cancel: &CancellationToken,
    ) -> Result<Option<FileRecord>> {
        tracing::debug!(%urn, %category, "searching for files under primary urn");

        let mut files = self.urn_files(urn, category, cancel).await?;

        if files.len() == 1 {
            let file = files.pop();
            if let Some(file) = &file {
                tracing::info!(%urn, %file, "only one file available, returning it as-is");
            }
            return Ok(file);
        }

        if files.len() > 1 {
            tracing::debug!(%urn, count = files.len(), "more than one file available, zipping");
            ensure_active(cancel)?;
            let archive = build_flat_archive(urn, &files)?;
            tracing::info!(%urn, %archive, "returning archive");
            return Ok(Some(archive));
        }

        tracing::warn!(%urn, %category, "could not find any files");

        let Some(fallback_urns) = fallback_urns else {
            return Ok(None);
        };

        tracing::info!(%urn, fallback = ?fallback_urns, "pulling back files for fallback urns");

        let groups = self.urn_groups(fallback_urns, category, cancel).await?;
        if groups.is_empty() {
            tracing::info!(%urn, "no files for the primary urn or any fallback urn");
            return Ok(None);
        }

        ensure_active(cancel)?;
        let archive = build_grouped_archive(urn, &groups)?;
        tracing::info!(%urn, %archive, groups = groups.group_count(), "returning fallback archive");
        Ok(Some(archive))
    }

    /// Files for each urn, grouped in the order given. A repeated urn is only
    /// looked up once.
    async fn urn_groups(
        &self,
        urns: &[Urn],
        category: FileCategory,
        cancel: &CancellationToken,
    ) -> Result<UrnGroups> {
        let mut groups = UrnGroups::new();
        let mut seen = Vec::with_capacity(urns.len());

        for &urn in urns {
            if seen.contains(&urn) {
                continue;
            }
            seen.push(urn);
            let files = self.urn_files(urn, category, cancel).await?;
            groups.insert(urn, files);
        }

        Ok(groups)
    }

    /// Every fetchable file for one urn, in metadata order.
    async fn urn_files(
        &self,
        urn: Urn,
        category: FileCategory,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileRecord>> {
        tracing::debug!(%urn, %category, "pulling back file list");

        let locations = cancellable(cancel, self.resolver.resolve(urn, category)).await??;

        tracing::info!(%urn, results = locations.len(), "metadata returned");

        // At most `fetch_concurrency` fetches in flight; completions are
        // yielded in submission order.
        let mut remaining = locations.iter();
        let mut in_flight = FuturesOrdered::new();
        let mut files = Vec::with_capacity(locations.len());

        loop {
            while in_flight.len() < self.fetch_concurrency {
                let Some(location) = remaining.next() else { break };
                in_flight.push_back(self.fetch_one(location, cancel));
            }
            let Some(fetched) = in_flight.next().await else { break };
            if let Some(file) = fetched? {
                files.push(file);
            }
        }

        Ok(files)
    }

    async fn fetch_one(
        &self,
        location: &LocationRecord,
        cancel: &CancellationToken,
    ) -> Result<Option<FileRecord>> {
        tracing::debug!(%location, "pulling file");

        let file = cancellable(cancel, self.fetcher.fetch(location)).await??;
        match &file {
            Some(file) => tracing::info!(%location, %file, "pulled file"),
            None => tracing::warn!(%location, "no file could be found"),
        }
        Ok(file)
    }
}

/// Run `work` unless `cancel` fires first.
async fn cancellable<T>(cancel: &CancellationToken, work: impl Future<Output = T>) -> Result<T> {
    ensure_active(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ManagerError::Cancelled),
        output = work => Ok(output),
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ManagerError::Cancelled);
    }
    Ok(())
}
