use sqlx::PgPool;
use tracing::info;

use crate::config::{MemoryParameterStore, ADMIN_KEY_PARAM, HOST_PARAM};
use crate::errors::RecordSourceError;

/// Loads search service parameters from the host's `ir_config_parameter` table.
///
/// The table is read once; the resulting snapshot is an ordinary
/// [`MemoryParameterStore`] that can be placed in front of the environment in
/// a [`ConfigResolver`](crate::ConfigResolver).
pub struct PostgresParameterStore;

impl PostgresParameterStore {
    /// Snapshot the `meili.host` and `meili.admin_key` parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(MemoryParameterStore)` - Holding whichever keys are present
    /// * `Err(RecordSourceError)` - If the query fails
    pub async fn load(pool: &PgPool) -> Result<MemoryParameterStore, RecordSourceError> {
        let keys = vec![HOST_PARAM.to_string(), ADMIN_KEY_PARAM.to_string()];
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT key, value FROM ir_config_parameter WHERE key = ANY($1)")
                .bind(&keys)
                .fetch_all(pool)
                .await?;

        let store: MemoryParameterStore = rows
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();

        info!(count = store.len(), "Loaded search parameters from database");
        Ok(store)
    }
}
