//! Credential resolution for the search service.
//!
//! Host and admin key are read through one or more [`ParameterStore`]s. The
//! first store holding a non-empty value wins. A missing value is a normal
//! outcome reported as [`SearchIndexError::NotConfigured`], so callers can skip
//! indexing with a warning instead of failing.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::errors::SearchIndexError;

/// Parameter key holding the service base URL.
pub const HOST_PARAM: &str = "meili.host";
/// Parameter key holding the admin key.
pub const ADMIN_KEY_PARAM: &str = "meili.admin_key";

/// Base URL and admin key of the search service.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredentials {
    host: String,
    admin_key: String,
}

impl ServiceCredentials {
    /// Create credentials, trimming whitespace and any trailing `/` from the host.
    ///
    /// # Returns
    ///
    /// * `Ok(ServiceCredentials)` - If both values are non-empty after trimming
    /// * `Err(SearchIndexError::NotConfigured)` - If either value is empty
    /// * `Err(SearchIndexError::ValidationError)` - If the host is not an http(s) URL
    pub fn new(
        host: impl AsRef<str>,
        admin_key: impl AsRef<str>,
    ) -> Result<Self, SearchIndexError> {
        let host = host.as_ref().trim().trim_end_matches('/');
        let admin_key = admin_key.as_ref().trim();

        if host.is_empty() || admin_key.is_empty() {
            return Err(SearchIndexError::NotConfigured);
        }

        let url = Url::parse(host)
            .map_err(|e| SearchIndexError::validation(format!("Invalid host '{}': {}", host, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchIndexError::validation(format!(
                "Invalid host '{}': scheme must be http or https",
                host
            )));
        }

        Ok(Self {
            host: host.to_string(),
            admin_key: admin_key.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn admin_key(&self) -> &str {
        &self.admin_key
    }

    /// Join a path onto the host, e.g. `endpoint("/indexes")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }
}

// The admin key is a secret and must not end up in logs.
impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("host", &self.host)
            .field("admin_key", &"<redacted>")
            .finish()
    }
}

/// Read-only key/value configuration storage.
pub trait ParameterStore: Send + Sync {
    /// Return the raw value stored under `key`, if any.
    fn get_param(&self, key: &str) -> Option<String>;
}

/// Reads parameters from process environment variables.
///
/// `meili.host` maps to `MEILI_HOST` and `meili.admin_key` to
/// `MEILI_ADMIN_KEY`. Other keys are upper-cased with `.` replaced by `_`.
#[derive(Debug, Clone, Default)]
pub struct EnvParameterStore;

impl EnvParameterStore {
    pub fn new() -> Self {
        Self
    }

    fn variable_name(key: &str) -> String {
        key.replace('.', "_").to_uppercase()
    }
}

impl ParameterStore for EnvParameterStore {
    fn get_param(&self, key: &str) -> Option<String> {
        env::var(Self::variable_name(key)).ok()
    }
}

/// In-memory parameter store, used for database snapshots and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryParameterStore {
    values: HashMap<String, String>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any previous value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for MemoryParameterStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ParameterStore for MemoryParameterStore {
    fn get_param(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Resolves [`ServiceCredentials`] from an ordered list of parameter stores.
///
/// The resolver holds no mutable state and does not cache: every call to
/// [`ConfigResolver::resolve`] reads through to the stores.
#[derive(Clone, Default)]
pub struct ConfigResolver {
    stores: Vec<Arc<dyn ParameterStore>>,
}

impl ConfigResolver {
    /// Create a resolver with no stores. It always reports `NotConfigured`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a store. Earlier stores take precedence.
    pub fn with_store(mut self, store: Arc<dyn ParameterStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Resolver over the process environment only.
    pub fn from_env() -> Self {
        Self::new().with_store(Arc::new(EnvParameterStore::new()))
    }

    /// Resolve host and admin key.
    ///
    /// # Returns
    ///
    /// * `Ok(ServiceCredentials)` - If both parameters are set and non-empty
    /// * `Err(SearchIndexError::NotConfigured)` - If either is missing
    pub fn resolve(&self) -> Result<ServiceCredentials, SearchIndexError> {
        let host = self.lookup(HOST_PARAM);
        let admin_key = self.lookup(ADMIN_KEY_PARAM);

        match (host, admin_key) {
            (Some(host), Some(admin_key)) => ServiceCredentials::new(host, admin_key),
            (host, admin_key) => {
                debug!(
                    host_set = host.is_some(),
                    admin_key_set = admin_key.is_some(),
                    "Search service credentials incomplete"
                );
                Err(SearchIndexError::NotConfigured)
            }
        }
    }

    /// First non-empty value for `key` across the stores.
    fn lookup(&self, key: &str) -> Option<String> {
        self.stores
            .iter()
            .filter_map(|store| store.get_param(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}
