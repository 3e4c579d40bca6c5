//! Meilisearch client configuration.
//!
//! Header names and per-operation timeouts for the HTTP client.

use std::time::Duration;

/// Default name of the fallback authentication header.
pub const DEFAULT_API_KEY_HEADER: &str = "X-Meili-API-Key";

/// Configuration for the [`MeilisearchProvider`](super::MeilisearchProvider).
///
/// The authentication header names differ across service deployments, so the
/// fallback header is configurable rather than fixed at call sites.
#[derive(Debug, Clone)]
pub struct MeilisearchConfig {
    /// Header carrying the raw admin key when Bearer authentication is rejected.
    pub api_key_header: String,
    /// Timeout for `GET /indexes` during connection verification.
    pub verify_timeout: Duration,
    /// Timeout for `GET /health`.
    pub health_timeout: Duration,
    /// Timeout for `POST /indexes`.
    pub create_index_timeout: Duration,
    /// Timeout for document upserts. Writes can be large and slow.
    pub upsert_timeout: Duration,
    /// Timeout for batch deletes.
    pub delete_timeout: Duration,
    /// Timeout for settings updates.
    pub settings_timeout: Duration,
}

impl Default for MeilisearchConfig {
    fn default() -> Self {
        Self {
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            verify_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(10),
            create_index_timeout: Duration::from_secs(5),
            upsert_timeout: Duration::from_secs(30),
            delete_timeout: Duration::from_secs(10),
            settings_timeout: Duration::from_secs(30),
        }
    }
}

impl MeilisearchConfig {
    /// Use a different fallback authentication header.
    ///
    /// # Arguments
    ///
    /// * `header` - Header name, e.g. `X-Meili-API-Key` or `X-Api-Key`
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Apply one timeout to every operation.
    pub fn with_uniform_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self.health_timeout = timeout;
        self.create_index_timeout = timeout;
        self.upsert_timeout = timeout;
        self.delete_timeout = timeout;
        self.settings_timeout = timeout;
        self
    }
}
