//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search service operations,
//! allowing the hooks and the bulk reconciler to be driven by the HTTP client
//! in production and by mock implementations in tests.

use async_trait::async_trait;
use meili_sync_shared::{IndexDocument, IndexSettings};

use crate::errors::SearchIndexError;
use crate::types::{AuthScheme, ConnectionReport};

/// Abstracts the remote search service.
///
/// Every operation returns `Result<T, SearchIndexError>`. Implementations
/// without credentials must return [`SearchIndexError::NotConfigured`] without
/// attempting any network I/O.
///
/// # Idempotency
///
/// Upserts are keyed by document id (last write wins), deletes of unknown ids
/// succeed, and settings updates overwrite. Callers may therefore repeat any
/// operation after a failure.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Whether credentials are available.
    fn is_configured(&self) -> bool;

    /// Base URL of the service, or an empty string when not configured.
    fn host(&self) -> &str;

    /// Issue a lightweight authenticated request.
    ///
    /// Bearer authentication is tried first. On a 401 the request is retried
    /// exactly once with the fallback header. No other status triggers a retry.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthScheme)` - The scheme the service accepted
    /// * `Err(SearchIndexError)` - If both schemes were rejected or the request failed
    async fn verify_connection(&self) -> Result<AuthScheme, SearchIndexError>;

    /// Create an index if it does not exist.
    ///
    /// Any failure (including "already exists") is logged and swallowed.
    ///
    /// # Arguments
    ///
    /// * `index_uid` - Identifier of the index
    /// * `primary_key` - Name of the document primary key field
    async fn ensure_index(&self, index_uid: &str, primary_key: &str);

    /// Add or replace documents in an index.
    ///
    /// # Arguments
    ///
    /// * `index_uid` - Identifier of the target index
    /// * `documents` - Non-empty batch of documents
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the service accepted the batch (200, 201 or 202)
    /// * `Err(SearchIndexError)` - For an empty batch, any other status, or a transport failure
    async fn upsert_documents(
        &self,
        index_uid: &str,
        documents: &[IndexDocument],
    ) -> Result<(), SearchIndexError>;

    /// Delete documents by id.
    ///
    /// Ids unknown to the index are not an error.
    ///
    /// # Arguments
    ///
    /// * `index_uid` - Identifier of the target index
    /// * `ids` - Non-empty list of document ids
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the service accepted the deletion (200, 201 or 202)
    /// * `Err(SearchIndexError)` - For an empty list, any other status, or a transport failure
    async fn delete_documents(&self, index_uid: &str, ids: &[String])
        -> Result<(), SearchIndexError>;

    /// Replace the index settings.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the service answered 200 or 202
    /// * `Err(SearchIndexError)` - Otherwise
    async fn configure_index_settings(
        &self,
        index_uid: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError>;

    /// Query the service health endpoint.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the service reports itself available
    /// * `Ok(false)` - If it answered but is not available
    /// * `Err(SearchIndexError)` - If the request failed
    async fn health_check(&self) -> Result<bool, SearchIndexError>;

    /// Interactive connection diagnostics.
    ///
    /// Runs [`verify_connection`](Self::verify_connection) followed by
    /// [`health_check`](Self::health_check). Failures are returned as
    /// [`SearchIndexError::ConnectionTestFailed`] so the caller can show them to
    /// the operator. A missing configuration is returned unchanged.
    async fn test_connection(&self) -> Result<ConnectionReport, SearchIndexError> {
        if !self.is_configured() {
            return Err(SearchIndexError::NotConfigured);
        }

        let auth_scheme = self
            .verify_connection()
            .await
            .map_err(|e| SearchIndexError::connection_test(self.host(), e.to_string()))?;

        let healthy = self
            .health_check()
            .await
            .map_err(|e| SearchIndexError::connection_test(self.host(), e.to_string()))?;

        Ok(ConnectionReport {
            host: self.host().to_string(),
            auth_scheme,
            healthy,
        })
    }
}
