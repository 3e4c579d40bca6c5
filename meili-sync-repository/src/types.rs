//! Result types for search service operations.

use std::fmt;

/// Authentication header scheme accepted by the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer {admin_key}`.
    #[default]
    Bearer,
    /// The admin key sent raw in the fallback header (`X-Meili-API-Key` by default).
    ApiKeyHeader,
}

impl AuthScheme {
    /// The scheme to try after this one was rejected.
    pub fn alternate(self) -> Self {
        match self {
            AuthScheme::Bearer => AuthScheme::ApiKeyHeader,
            AuthScheme::ApiKeyHeader => AuthScheme::Bearer,
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Bearer => write!(f, "bearer"),
            AuthScheme::ApiKeyHeader => write!(f, "api-key-header"),
        }
    }
}

/// Outcome of an interactive connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    /// Host that was contacted.
    pub host: String,
    /// Scheme the service accepted.
    pub auth_scheme: AuthScheme,
    /// Whether `/health` reported the service as available.
    pub healthy: bool,
}

impl ConnectionReport {
    /// Human readable summary shown to the operator.
    pub fn message(&self) -> String {
        let health = if self.healthy {
            "available"
        } else {
            "reachable, health check did not report available"
        };
        format!(
            "Successfully connected to Meilisearch server at {} ({} auth, {})",
            self.host, self.auth_scheme, health
        )
    }
}
