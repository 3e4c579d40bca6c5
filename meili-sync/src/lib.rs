//! # Meili Sync
//!
//! Keeps Meilisearch indexes in sync with host inventory records.
//!
//! ## Architecture
//!
//! Records flow one way, from the host record store to the search service:
//!
//! 1. **Adapter**: Turns host records into index documents
//! 2. **Hooks**: Push single-record changes as they happen, never failing the caller
//! 3. **Reconciler**: Re-indexes a full record set in rate-limited batches
//! 4. **Webhook**: Acknowledges task callbacks from the search service
//!
//! ## Modules
//!
//! - [`adapter`]: Record to document conversion, one adapter per record type
//! - [`hooks`]: Lifecycle hooks for create, update and delete
//! - [`reconciler`]: Bulk reindexing pipeline and operator notification
//! - [`webhook`]: Task webhook HTTP endpoint
//! - [`config`]: Configuration and dependency initialization

pub mod adapter;
pub mod config;
pub mod hooks;
pub mod reconciler;
pub mod webhook;

pub use adapter::{DocumentAdapter, LotAdapter};
pub use config::Dependencies;
pub use hooks::{HookOperation, SyncHooks};
pub use reconciler::{
    BulkReconciler, Notification, ReconcileOutcome, ReconcileReport, ReconcilerConfig,
    ReconcilerState, Severity,
};

use meili_sync_repository::{RecordSourceError, SearchIndexError};
use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search service error.
    #[error("Search service error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// Record store error.
    #[error("Record source error: {0}")]
    SourceError(#[from] RecordSourceError),

    /// A bulk reindex did not reach every record.
    #[error("Reindex incomplete: {0}")]
    ReindexIncomplete(String),

    /// Server or terminal IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
