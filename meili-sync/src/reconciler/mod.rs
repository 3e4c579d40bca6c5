//! Bulk reindexing pipeline.
//!
//! Re-indexes a full record set in fixed-size batches with a delay between
//! batches. A failed batch is counted and skipped; the run always finishes
//! with a report.

mod report;

pub use report::{Notification, ReconcileOutcome, ReconcileReport, Severity};

use std::sync::Arc;
use std::time::Duration;

use meili_sync_repository::{RecordSource, SearchIndexProvider};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::adapter::DocumentAdapter;

/// Default number of records per upsert request.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default pause between two batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Configuration for the bulk reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Records per upsert request. Never zero.
    pub batch_size: usize,
    /// Pause between batches, not applied after the last one.
    pub batch_delay: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl ReconcilerConfig {
    /// Set the batch size. Zero is raised to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }
}

/// Lifecycle of a reconciler. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Idle,
    Running,
    Done,
}

/// Re-indexes every record of one type.
///
/// Batches run strictly one after another. The order of a run is:
/// fetch all records, stop if there are none, ensure the index exists,
/// apply the adapter's settings (best effort), then upsert each batch.
/// Progress is not checkpointed: an interrupted run starts over.
pub struct BulkReconciler<A, S>
where
    A: DocumentAdapter,
    S: RecordSource<Record = A::Record>,
{
    adapter: Arc<A>,
    source: Arc<S>,
    provider: Arc<dyn SearchIndexProvider>,
    config: ReconcilerConfig,
    state: ReconcilerState,
    report: Option<ReconcileReport>,
}

impl<A, S> BulkReconciler<A, S>
where
    A: DocumentAdapter,
    S: RecordSource<Record = A::Record>,
{
    /// Create a reconciler with the default batch size and delay.
    pub fn new(adapter: Arc<A>, source: Arc<S>, provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(adapter, source, provider, ReconcilerConfig::default())
    }

    /// Create a reconciler with custom configuration.
    pub fn with_config(
        adapter: Arc<A>,
        source: Arc<S>,
        provider: Arc<dyn SearchIndexProvider>,
        config: ReconcilerConfig,
    ) -> Self {
        let batch_size = config.batch_size;
        let config = config.with_batch_size(batch_size);
        Self {
            adapter,
            source,
            provider,
            config,
            state: ReconcilerState::Idle,
            report: None,
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run the reindex to completion.
    ///
    /// A reconciler runs once. Calling `run` again after it is `Done` returns
    /// the first report without doing any work.
    #[instrument(skip(self), fields(index_uid = %self.adapter.index_id()))]
    pub async fn run(&mut self) -> ReconcileReport {
        if let Some(report) = &self.report {
            warn!("Reconciler already finished, returning previous report");
            return report.clone();
        }

        self.state = ReconcilerState::Running;
        let report = self.reconcile().await;
        self.state = ReconcilerState::Done;

        info!(
            total = report.total,
            indexed = report.indexed,
            failed = report.failed,
            batches = report.batches,
            outcome = ?report.outcome,
            "Bulk indexing completed"
        );

        self.report = Some(report.clone());
        report
    }

    async fn reconcile(&self) -> ReconcileReport {
        let index_uid = self.adapter.index_id();
        let label = self.adapter.record_label();
        let mut report = ReconcileReport::start(index_uid, label);

        if !self.provider.is_configured() {
            warn!("Meilisearch not configured, skipping bulk indexing");
            return report.finish(ReconcileOutcome::NotConfigured);
        }

        info!(label, "Starting bulk indexing");

        let records = match self.source.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Failed to fetch records for bulk indexing");
                return report.finish(ReconcileOutcome::SourceUnavailable {
                    reason: e.to_string(),
                });
            }
        };

        let total = records.len();
        report.total = total;
        if total == 0 {
            info!(label, "No records found to index");
            return report.finish(ReconcileOutcome::Empty);
        }

        info!(total, label, "Found records to index");

        self.provider
            .ensure_index(index_uid, self.adapter.primary_key())
            .await;

        if let Some(settings) = self.adapter.index_settings() {
            if let Err(e) = self
                .provider
                .configure_index_settings(index_uid, &settings)
                .await
            {
                warn!(error = %e, "Failed to configure index settings, continuing with indexing");
            }
        }

        let batch_size = self.config.batch_size;
        let batch_count = total.div_ceil(batch_size);

        for (batch_index, batch) in records.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size + 1;
            let batch_end = batch_index * batch_size + batch.len();
            let documents = self.adapter.produce_documents(batch);

            match self.provider.upsert_documents(index_uid, &documents).await {
                Ok(()) => {
                    report.indexed += batch.len();
                    let progress = batch_end as f64 / total as f64 * 100.0;
                    info!(
                        batch_start,
                        batch_end,
                        total,
                        "Indexed batch {}-{} of {} ({:.1}%)",
                        batch_start,
                        batch_end,
                        total,
                        progress
                    );
                }
                Err(e) => {
                    report.failed += batch.len();
                    error!(
                        batch_start,
                        batch_end,
                        error = %e,
                        "Failed to index batch {}-{}",
                        batch_start,
                        batch_end
                    );
                }
            }
            report.batches += 1;

            if batch_index + 1 < batch_count {
                sleep(self.config.batch_delay).await;
            }
        }

        let outcome = if report.failed == 0 {
            ReconcileOutcome::Complete
        } else {
            ReconcileOutcome::Partial
        };
        report.finish(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::LotAdapter;
    use async_trait::async_trait;
    use meili_sync_repository::{AuthScheme, RecordSourceError, SearchIndexError};
    use meili_sync_shared::{IndexDocument, IndexSettings, LotRecord};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct MemoryLots {
        lots: Vec<LotRecord>,
        fail: bool,
        fetches: AtomicUsize,
    }

    impl MemoryLots {
        fn with_count(count: i64) -> Self {
            Self {
                lots: (1..=count)
                    .map(|id| LotRecord::new(id, format!("LOT-{}", id)))
                    .collect(),
                fail: false,
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_count(0)
            }
        }
    }

    #[async_trait]
    impl RecordSource for MemoryLots {
        type Record = LotRecord;

        async fn fetch_all(&self) -> Result<Vec<LotRecord>, RecordSourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RecordSourceError::unavailable("database is down"));
            }
            Ok(self.lots.clone())
        }

        async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<LotRecord>, RecordSourceError> {
            Ok(self
                .lots
                .iter()
                .filter(|lot| ids.contains(&lot.id))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MockProvider {
        unconfigured: bool,
        fail_settings: bool,
        /// 1-based upsert calls that fail.
        failing_batches: HashSet<usize>,
        upserts: Mutex<Vec<usize>>,
        http_calls: AtomicUsize,
    }

    impl MockProvider {
        fn upsert_sizes(&self) -> Vec<usize> {
            self.upserts.lock().unwrap().clone()
        }

        fn http_calls(&self) -> usize {
            self.http_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        fn is_configured(&self) -> bool {
            !self.unconfigured
        }

        fn host(&self) -> &str {
            "http://mock"
        }

        async fn verify_connection(&self) -> Result<AuthScheme, SearchIndexError> {
            self.http_calls.fetch_add(1, Ordering::SeqCst);
            Ok(AuthScheme::Bearer)
        }

        async fn ensure_index(&self, _index_uid: &str, _primary_key: &str) {
            self.http_calls.fetch_add(1, Ordering::SeqCst);
        }

        async fn upsert_documents(
            &self,
            _index_uid: &str,
            documents: &[IndexDocument],
        ) -> Result<(), SearchIndexError> {
            self.http_calls.fetch_add(1, Ordering::SeqCst);
            let mut upserts = self.upserts.lock().unwrap();
            upserts.push(documents.len());
            if self.failing_batches.contains(&upserts.len()) {
                return Err(SearchIndexError::rejected(503, "rate limited"));
            }
            Ok(())
        }

        async fn delete_documents(
            &self,
            _index_uid: &str,
            _ids: &[String],
        ) -> Result<(), SearchIndexError> {
            self.http_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn configure_index_settings(
            &self,
            _index_uid: &str,
            _settings: &IndexSettings,
        ) -> Result<(), SearchIndexError> {
            self.http_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_settings {
                return Err(SearchIndexError::transport("timed out"));
            }
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            self.http_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn reconciler(
        source: MemoryLots,
        provider: Arc<MockProvider>,
    ) -> BulkReconciler<LotAdapter, MemoryLots> {
        BulkReconciler::new(Arc::new(LotAdapter), Arc::new(source), provider)
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_and_delays() {
        let provider = Arc::new(MockProvider::default());
        let mut reconciler = reconciler(MemoryLots::with_count(1201), provider.clone());
        assert_eq!(reconciler.state(), ReconcilerState::Idle);

        let started = Instant::now();
        let report = reconciler.run().await;
        let elapsed = started.elapsed();

        assert_eq!(provider.upsert_sizes(), vec![500, 500, 201]);
        assert_eq!(report.outcome, ReconcileOutcome::Complete);
        assert_eq!(report.total, 1201);
        assert_eq!(report.indexed, 1201);
        assert_eq!(report.failed, 0);
        assert_eq!(report.batches, 3);
        // Two pauses of 500ms: none after the last batch.
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));
        assert_eq!(reconciler.state(), ReconcilerState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_multiple_of_batch_size() {
        let provider = Arc::new(MockProvider::default());
        let mut reconciler = reconciler(MemoryLots::with_count(1000), provider.clone());

        let started = Instant::now();
        let report = reconciler.run().await;

        assert_eq!(provider.upsert_sizes(), vec![500, 500]);
        assert_eq!(report.batches, 2);
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_does_not_stop_run() {
        let provider = Arc::new(MockProvider {
            failing_batches: HashSet::from([2]),
            ..Default::default()
        });
        let mut reconciler = reconciler(MemoryLots::with_count(1201), provider.clone());

        let report = reconciler.run().await;

        assert_eq!(provider.upsert_sizes().len(), 3);
        assert_eq!(report.indexed, 701);
        assert_eq!(report.failed, 500);
        assert_eq!(report.indexed + report.failed, report.total);
        assert_eq!(report.outcome, ReconcileOutcome::Partial);
        assert_eq!(report.notification().severity, Severity::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_batch_failing() {
        let provider = Arc::new(MockProvider {
            failing_batches: HashSet::from([1, 2]),
            ..Default::default()
        });
        let mut reconciler = reconciler(MemoryLots::with_count(600), provider.clone());

        let report = reconciler.run().await;

        assert_eq!(report.indexed, 0);
        assert_eq!(report.failed, 600);
        assert_eq!(report.outcome, ReconcileOutcome::Partial);
    }

    #[tokio::test]
    async fn test_empty_source_makes_no_calls() {
        let provider = Arc::new(MockProvider::default());
        let mut reconciler = reconciler(MemoryLots::with_count(0), provider.clone());

        let report = reconciler.run().await;

        assert_eq!(report.outcome, ReconcileOutcome::Empty);
        assert_eq!((report.indexed, report.failed), (0, 0));
        assert_eq!(provider.http_calls(), 0);
        assert_eq!(report.notification().message, "No lots found to index.");
    }

    #[tokio::test]
    async fn test_not_configured_skips_everything() {
        let provider = Arc::new(MockProvider {
            unconfigured: true,
            ..Default::default()
        });
        let source = Arc::new(MemoryLots::with_count(10));
        let mut reconciler =
            BulkReconciler::new(Arc::new(LotAdapter), source.clone(), provider.clone());

        let report = reconciler.run().await;

        assert_eq!(report.outcome, ReconcileOutcome::NotConfigured);
        assert_eq!(provider.http_calls(), 0);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(report.notification().severity, Severity::Danger);
    }

    #[tokio::test]
    async fn test_source_failure_finishes_done() {
        let provider = Arc::new(MockProvider::default());
        let mut reconciler = reconciler(MemoryLots::failing(), provider.clone());

        let report = reconciler.run().await;

        assert!(matches!(
            report.outcome,
            ReconcileOutcome::SourceUnavailable { .. }
        ));
        assert_eq!(reconciler.state(), ReconcilerState::Done);
        assert_eq!(provider.http_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_failure_does_not_abort() {
        let provider = Arc::new(MockProvider {
            fail_settings: true,
            ..Default::default()
        });
        let mut reconciler = reconciler(MemoryLots::with_count(3), provider.clone());

        let report = reconciler.run().await;

        assert_eq!(report.outcome, ReconcileOutcome::Complete);
        assert_eq!(report.indexed, 3);
        // ensure_index, settings, one upsert
        assert_eq!(provider.http_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_returns_first_report() {
        let provider = Arc::new(MockProvider::default());
        let mut reconciler = reconciler(MemoryLots::with_count(5), provider.clone());

        let first = reconciler.run().await;
        let second = reconciler.run().await;

        assert_eq!(first, second);
        assert_eq!(provider.upsert_sizes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_batch_size() {
        let provider = Arc::new(MockProvider::default());
        let mut reconciler = BulkReconciler::with_config(
            Arc::new(LotAdapter),
            Arc::new(MemoryLots::with_count(7)),
            provider.clone(),
            ReconcilerConfig::default()
                .with_batch_size(3)
                .with_batch_delay(Duration::from_millis(10)),
        );

        let started = Instant::now();
        reconciler.run().await;

        assert_eq!(provider.upsert_sizes(), vec![3, 3, 1]);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let config = ReconcilerConfig::default().with_batch_size(0);
        assert_eq!(config.batch_size, 1);
        assert_eq!(ReconcilerConfig::default().batch_size, 500);
        assert_eq!(
            ReconcilerConfig::default().batch_delay,
            Duration::from_millis(500)
        );
    }
}
