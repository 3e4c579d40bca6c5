//! Record source trait definition.

use async_trait::async_trait;

use crate::errors::RecordSourceError;

/// Read access to the host record store.
///
/// The store owns the records; this trait only projects them for indexing.
/// Reads are unbounded: `fetch_all` returns the full record set in one call.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Record projection produced by this source.
    type Record: Send + Sync;

    /// Fetch every record.
    async fn fetch_all(&self) -> Result<Vec<Self::Record>, RecordSourceError>;

    /// Fetch the records with the given ids. Unknown ids are skipped.
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<Self::Record>, RecordSourceError>;
}
