//! Record lifecycle hooks.
//!
//! The host calls these after a record is created or updated and before it is
//! deleted. Indexing failures are logged and discarded at this boundary: a
//! hook never returns an error, so the record mutation that triggered it
//! always completes.

use std::fmt;
use std::sync::Arc;

use meili_sync_repository::{SearchIndexError, SearchIndexProvider};
use tracing::{debug, error, info, instrument, warn};

use crate::adapter::DocumentAdapter;

/// Lifecycle point that triggered a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for HookOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookOperation::Create => write!(f, "create"),
            HookOperation::Update => write!(f, "update"),
            HookOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Pushes record changes to the search service as they happen.
///
/// Each hook awaits a single round trip (bounded by the provider's timeouts)
/// and returns `true` when the index was updated. There is no retry: a failed
/// update leaves the index stale until the next change or bulk reindex.
pub struct SyncHooks<A: DocumentAdapter> {
    adapter: Arc<A>,
    provider: Arc<dyn SearchIndexProvider>,
}

impl<A: DocumentAdapter> SyncHooks<A> {
    /// Create hooks for one record type.
    pub fn new(adapter: Arc<A>, provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { adapter, provider }
    }

    /// Hook run after records are created.
    pub async fn after_create(&self, records: &[A::Record]) -> bool {
        let result = self.index(records).await;
        self.settle(HookOperation::Create, records.len(), result)
    }

    /// Hook run after records are updated.
    pub async fn after_update(&self, records: &[A::Record]) -> bool {
        let result = self.index(records).await;
        self.settle(HookOperation::Update, records.len(), result)
    }

    /// Hook run before records are deleted.
    pub async fn before_delete(&self, records: &[A::Record]) -> bool {
        let result = self.remove(records).await;
        self.settle(HookOperation::Delete, records.len(), result)
    }

    /// Upsert the documents for `records`, creating the index first if needed.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of documents pushed (0 for an empty slice, without I/O)
    /// * `Err(SearchIndexError)` - If the service is not configured or rejected the batch
    #[instrument(skip(self, records), fields(index_uid = %self.adapter.index_id(), count = records.len()))]
    pub async fn index(&self, records: &[A::Record]) -> Result<usize, SearchIndexError> {
        if !self.provider.is_configured() {
            return Err(SearchIndexError::NotConfigured);
        }

        let documents = self.adapter.produce_documents(records);
        if documents.is_empty() {
            return Ok(0);
        }

        let index_uid = self.adapter.index_id();
        self.provider
            .ensure_index(index_uid, self.adapter.primary_key())
            .await;
        self.provider
            .upsert_documents(index_uid, &documents)
            .await?;

        Ok(documents.len())
    }

    /// Delete the documents for `records`.
    ///
    /// Ids that were never indexed are still sent; the service treats them as
    /// a successful no-op.
    #[instrument(skip(self, records), fields(index_uid = %self.adapter.index_id(), count = records.len()))]
    pub async fn remove(&self, records: &[A::Record]) -> Result<usize, SearchIndexError> {
        if !self.provider.is_configured() {
            return Err(SearchIndexError::NotConfigured);
        }

        let ids: Vec<String> = records
            .iter()
            .map(|record| self.adapter.document_id(record))
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        self.provider
            .delete_documents(self.adapter.index_id(), &ids)
            .await?;

        Ok(ids.len())
    }

    /// Log the outcome and discard any error.
    fn settle(
        &self,
        operation: HookOperation,
        count: usize,
        result: Result<usize, SearchIndexError>,
    ) -> bool {
        let index_uid = self.adapter.index_id();
        match result {
            Ok(0) => {
                debug!(%operation, index_uid, "Nothing to sync");
                true
            }
            Ok(synced) => {
                info!(%operation, index_uid, count = synced, "Synced documents to Meilisearch");
                true
            }
            Err(SearchIndexError::NotConfigured) => {
                warn!(%operation, index_uid, count, "Meilisearch not configured, skipping sync");
                false
            }
            Err(e) => {
                error!(
                    %operation,
                    index_uid,
                    count,
                    error = %e,
                    "Failed to sync documents to Meilisearch"
                );
                false
            }
        }
    }
}
