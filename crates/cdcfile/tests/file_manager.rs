use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cdcfile::{FileManager, ManagerError};
use cdcfile_archive::read_archive;
use cdcfile_catalog::{CatalogError, MetadataResolver};
use cdcfile_model::{FileCategory, FileRecord, LocationRecord, Urn, ZIP_CONTENT_TYPE};
use cdcfile_storage::{BlobFetcher, StorageError};
use tokio_util::sync::CancellationToken;

fn location(urn: u32, name: &str) -> LocationRecord {
    LocationRecord::parse(&format!("file:///share/{urn}/{name}")).unwrap()
}

fn pdf(name: &str, body: &str) -> FileRecord {
    FileRecord::new("application/pdf", body.as_bytes().to_vec()).with_file_name(name)
}

#[derive(Default)]
struct MockResolver {
    records: HashMap<Urn, Vec<LocationRecord>>,
    failing: Option<Urn>,
    calls: Mutex<Vec<Urn>>,
}

impl MockResolver {
    fn with(mut self, urn: u32, names: &[&str]) -> Self {
        self.records
            .insert(Urn::new(urn), names.iter().map(|name| location(urn, name)).collect());
        self
    }

    fn failing_on(mut self, urn: u32) -> Self {
        self.failing = Some(Urn::new(urn));
        self
    }

    fn calls(&self) -> Vec<Urn> { self.calls.lock().unwrap().clone() }
}

impl MetadataResolver for MockResolver {
    async fn resolve(&self, urn: Urn, _category: FileCategory) -> cdcfile_catalog::Result<Vec<LocationRecord>> {
        self.calls.lock().unwrap().push(urn);
        if self.failing == Some(urn) {
            return Err(CatalogError::Io {
                path: PathBuf::from("catalog"),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "database unreachable"),
            });
        }
        Ok(self.records.get(&urn).cloned().unwrap_or_default())
    }
}

/// Serves blobs keyed by location, optionally slowing or cancelling fetches.
#[derive(Default)]
struct MockFetcher {
    blobs: HashMap<String, FileRecord>,
    delays: HashMap<String, Duration>,
    failing: Option<String>,
    cancel_on_call: Option<(usize, CancellationToken)>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    fn with(mut self, urn: u32, file: FileRecord) -> Self {
        let key = location(urn, file.file_name().unwrap()).to_string();
        self.blobs.insert(key, file);
        self
    }

    fn delayed(mut self, urn: u32, name: &str, delay: Duration) -> Self {
        self.delays.insert(location(urn, name).to_string(), delay);
        self
    }

    fn failing_on(mut self, urn: u32, name: &str) -> Self {
        self.failing = Some(location(urn, name).to_string());
        self
    }

    /// Fire `token` during the `call`th fetch (1-based) and never finish it.
    fn cancelling(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl BlobFetcher for MockFetcher {
    async fn fetch(&self, location: &LocationRecord) -> cdcfile_storage::Result<Option<FileRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let key = location.to_string();

        if let Some((on_call, token)) = &self.cancel_on_call {
            if *on_call == call {
                token.cancel();
                std::future::pending::<()>().await;
            }
        }

        if self.failing.as_deref() == Some(key.as_str()) {
            return Err(StorageError::Transport {
                location: key,
                source: "connection reset".into(),
            });
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(self.blobs.get(&key).cloned())
    }
}

async fn get(
    manager: &FileManager<MockResolver, MockFetcher>,
    urn: u32,
    fallback: Option<&[Urn]>,
) -> cdcfile::Result<Option<FileRecord>> {
    manager
        .get_file(Urn::new(urn), FileCategory::Report, fallback, &CancellationToken::new())
        .await
}

fn entry_names(archive: &FileRecord) -> Vec<String> {
    read_archive(archive.content_bytes())
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

#[tokio::test]
async fn no_metadata_is_absent() {
    let manager = FileManager::new(MockResolver::default(), MockFetcher::default());
    assert_eq!(get(&manager, 1, None).await.unwrap(), None);
    assert_eq!(manager.fetcher().calls(), 0);
}

#[tokio::test]
async fn single_file_is_returned_unchanged() {
    let file = pdf("doc1.pdf", "only document");
    let manager = FileManager::new(
        MockResolver::default().with(7, &["doc1.pdf"]),
        MockFetcher::default().with(7, file.clone()),
    );

    let result = get(&manager, 7, None).await.unwrap().unwrap();
    assert_eq!(result, file);
    assert_eq!(result.content_type(), "application/pdf");
}

#[tokio::test]
async fn single_missing_blob_is_absent() {
    let manager = FileManager::new(MockResolver::default().with(7, &["gone.pdf"]), MockFetcher::default());
    assert_eq!(get(&manager, 7, None).await.unwrap(), None);
    assert_eq!(manager.fetcher().calls(), 1);
}

#[tokio::test]
async fn three_reports_are_zipped_flat() {
    let manager = FileManager::new(
        MockResolver::default().with(1234, &["doc1.pdf", "doc2.pdf", "doc3.pdf"]),
        MockFetcher::default()
            .with(1234, pdf("doc1.pdf", "one"))
            .with(1234, pdf("doc2.pdf", "two"))
            .with(1234, pdf("doc3.pdf", "three")),
    );

    let archive = get(&manager, 1234, None).await.unwrap().unwrap();
    assert_eq!(archive.content_type(), ZIP_CONTENT_TYPE);
    assert_eq!(archive.file_name(), Some("1234 files.zip"));

    let entries = read_archive(archive.content_bytes()).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["doc1.pdf", "doc2.pdf", "doc3.pdf"]);
    assert_eq!(&entries[2].content[..], b"three");
}

#[tokio::test]
async fn missing_blobs_are_skipped() {
    let manager = FileManager::new(
        MockResolver::default().with(5, &["a.pdf", "gone.pdf", "b.pdf"]),
        MockFetcher::default().with(5, pdf("a.pdf", "a")).with(5, pdf("b.pdf", "b")),
    );

    let archive = get(&manager, 5, None).await.unwrap().unwrap();
    assert_eq!(entry_names(&archive), vec!["a.pdf", "b.pdf"]);
}

#[tokio::test]
async fn one_survivor_of_many_records_is_returned_bare() {
    let file = pdf("b.pdf", "b");
    let manager = FileManager::new(
        MockResolver::default().with(5, &["gone.pdf", "b.pdf"]),
        MockFetcher::default().with(5, file.clone()),
    );
    assert_eq!(get(&manager, 5, None).await.unwrap(), Some(file));
}

#[tokio::test]
async fn fallback_files_are_grouped_by_urn() {
    let manager = FileManager::new(
        MockResolver::default()
            .with(20, &["plan.pdf", "survey.pdf"])
            .with(30, &["notes.pdf"]),
        MockFetcher::default()
            .with(20, pdf("plan.pdf", "plan"))
            .with(20, pdf("survey.pdf", "survey"))
            .with(30, pdf("notes.pdf", "notes")),
    );

    let fallback = [Urn::new(20), Urn::new(30)];
    let archive = get(&manager, 10, Some(&fallback)).await.unwrap().unwrap();

    assert_eq!(archive.file_name(), Some("10 files.zip"));
    assert_eq!(archive.content_type(), ZIP_CONTENT_TYPE);
    assert_eq!(
        entry_names(&archive),
        vec!["20 files/plan.pdf", "20 files/survey.pdf", "30 files/notes.pdf"]
    );
    assert_eq!(manager.resolver().calls(), vec![Urn::new(10), Urn::new(20), Urn::new(30)]);
}

#[tokio::test]
async fn single_fallback_file_is_still_archived() {
    let manager = FileManager::new(
        MockResolver::default().with(20, &["plan.pdf"]),
        MockFetcher::default().with(20, pdf("plan.pdf", "plan")),
    );

    let archive = get(&manager, 10, Some(&[Urn::new(20)])).await.unwrap().unwrap();
    assert!(archive.is_zip());
    assert_eq!(entry_names(&archive), vec!["20 files/plan.pdf"]);
}

#[tokio::test]
async fn empty_fallback_union_is_absent() {
    let manager = FileManager::new(
        MockResolver::default().with(20, &["gone.pdf"]),
        MockFetcher::default(),
    );

    let fallback = [Urn::new(20), Urn::new(30)];
    assert_eq!(get(&manager, 10, Some(&fallback)).await.unwrap(), None);
}

#[tokio::test]
async fn fallback_not_consulted_when_primary_has_files() {
    let manager = FileManager::new(
        MockResolver::default().with(1, &["own.pdf"]).with(2, &["other.pdf"]),
        MockFetcher::default()
            .with(1, pdf("own.pdf", "own"))
            .with(2, pdf("other.pdf", "other")),
    );

    let result = get(&manager, 1, Some(&[Urn::new(2)])).await.unwrap().unwrap();
    assert_eq!(result.file_name(), Some("own.pdf"));
    assert_eq!(manager.resolver().calls(), vec![Urn::new(1)]);
    assert_eq!(manager.fetcher().calls(), 1);
}

#[tokio::test]
async fn repeated_fallback_urn_is_resolved_once() {
    let manager = FileManager::new(
        MockResolver::default().with(20, &["plan.pdf"]),
        MockFetcher::default().with(20, pdf("plan.pdf", "plan")),
    );

    let fallback = [Urn::new(20), Urn::new(20)];
    let archive = get(&manager, 10, Some(&fallback)).await.unwrap().unwrap();
    assert_eq!(entry_names(&archive), vec!["20 files/plan.pdf"]);
    assert_eq!(manager.resolver().calls(), vec![Urn::new(10), Urn::new(20)]);
}

#[tokio::test]
async fn resolver_failure_propagates_without_fallback() {
    let manager = FileManager::new(
        MockResolver::default().failing_on(1).with(2, &["other.pdf"]),
        MockFetcher::default().with(2, pdf("other.pdf", "other")),
    );

    let result = get(&manager, 1, Some(&[Urn::new(2)])).await;
    assert!(matches!(result, Err(ManagerError::Catalog(_))));
    assert_eq!(manager.resolver().calls(), vec![Urn::new(1)]);
}

#[tokio::test]
async fn fetch_failure_propagates() {
    let manager = FileManager::new(
        MockResolver::default().with(1, &["a.pdf", "b.pdf"]),
        MockFetcher::default()
            .with(1, pdf("a.pdf", "a"))
            .with(1, pdf("b.pdf", "b"))
            .failing_on(1, "b.pdf"),
    );

    let result = get(&manager, 1, Some(&[Urn::new(2)])).await;
    assert!(matches!(result, Err(ManagerError::Storage(StorageError::Transport { .. }))));
    assert_eq!(manager.resolver().calls(), vec![Urn::new(1)]);
}

#[tokio::test]
async fn cancellation_mid_fetch_reports_cancelled() {
    let cancel = CancellationToken::new();
    let manager = FileManager::new(
        MockResolver::default().with(1, &["a.pdf", "b.pdf", "c.pdf"]),
        MockFetcher::default()
            .with(1, pdf("a.pdf", "a"))
            .with(1, pdf("b.pdf", "b"))
            .with(1, pdf("c.pdf", "c"))
            .cancelling(2, cancel.clone()),
    );

    let result = manager
        .get_file(Urn::new(1), FileCategory::Report, None, &cancel)
        .await;
    assert!(matches!(result, Err(ManagerError::Cancelled)));
    assert_eq!(manager.fetcher().calls(), 2);
}

#[tokio::test]
async fn cancelled_before_start_touches_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let manager = FileManager::new(
        MockResolver::default().with(1, &["a.pdf"]),
        MockFetcher::default().with(1, pdf("a.pdf", "a")),
    );

    let result = manager
        .get_file(Urn::new(1), FileCategory::Report, None, &cancel)
        .await;
    assert!(matches!(result, Err(ManagerError::Cancelled)));
    assert!(manager.resolver().calls().is_empty());
    assert_eq!(manager.fetcher().calls(), 0);
}

#[tokio::test]
async fn parallel_fetches_keep_metadata_order() {
    let manager = FileManager::new(
        MockResolver::default().with(1, &["slow.pdf", "medium.pdf", "fast.pdf"]),
        MockFetcher::default()
            .with(1, pdf("slow.pdf", "slow"))
            .with(1, pdf("medium.pdf", "medium"))
            .with(1, pdf("fast.pdf", "fast"))
            .delayed(1, "slow.pdf", Duration::from_millis(60))
            .delayed(1, "medium.pdf", Duration::from_millis(30)),
    )
    .with_fetch_concurrency(3);

    let archive = get(&manager, 1, None).await.unwrap().unwrap();
    assert_eq!(entry_names(&archive), vec!["slow.pdf", "medium.pdf", "fast.pdf"]);
    assert!(manager.fetcher().max_in_flight.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn sequential_by_default() {
    let manager = FileManager::new(
        MockResolver::default().with(1, &["a.pdf", "b.pdf"]),
        MockFetcher::default()
            .with(1, pdf("a.pdf", "a"))
            .with(1, pdf("b.pdf", "b"))
            .delayed(1, "a.pdf", Duration::from_millis(10)),
    );

    get(&manager, 1, None).await.unwrap().unwrap();
    assert_eq!(manager.fetcher().max_in_flight.load(Ordering::SeqCst), 1);
}
