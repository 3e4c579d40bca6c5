//! Meilisearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! over the Meilisearch HTTP API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use meili_sync_shared::{IndexDocument, IndexSettings};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigResolver, ServiceCredentials};
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::meilisearch::client_config::MeilisearchConfig;
use crate::types::AuthScheme;
use crate::utils;

/// Meilisearch provider implementation.
///
/// Holds the resolved credentials, or `None` when the service is not
/// configured. In that case every operation returns
/// [`SearchIndexError::NotConfigured`] without touching the network.
///
/// Requests start with Bearer tokens. Any request answered with 401 is
/// retried once with the other scheme; a scheme the service accepts is
/// remembered and used for later requests.
///
/// # Example
///
/// ```ignore
/// use meili_sync_repository::{ConfigResolver, MeilisearchConfig, MeilisearchProvider};
///
/// let provider = MeilisearchProvider::from_resolver(
///     &ConfigResolver::from_env(),
///     MeilisearchConfig::default(),
/// )?;
/// provider.upsert_documents("lots", &documents).await?;
/// ```
pub struct MeilisearchProvider {
    client: Client,
    credentials: Option<ServiceCredentials>,
    config: MeilisearchConfig,
    use_api_key_header: AtomicBool,
}

impl MeilisearchProvider {
    /// Create a provider.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Resolved credentials, or `None` if not configured
    /// * `config` - Header names and timeouts
    ///
    /// # Returns
    ///
    /// * `Ok(MeilisearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the HTTP client cannot be built
    pub fn new(
        credentials: Option<ServiceCredentials>,
        config: MeilisearchConfig,
    ) -> Result<Self, SearchIndexError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SearchIndexError::transport(e.to_string()))?;

        match &credentials {
            Some(creds) => info!(
                host = %creds.host(),
                api_key_header = %config.api_key_header,
                "Created Meilisearch provider"
            ),
            None => warn!("Meilisearch not configured, indexing operations will be skipped"),
        }

        Ok(Self {
            client,
            credentials,
            config,
            use_api_key_header: AtomicBool::new(false),
        })
    }

    /// Create a provider from a resolver. A missing configuration yields an
    /// unconfigured provider rather than an error.
    pub fn from_resolver(
        resolver: &ConfigResolver,
        config: MeilisearchConfig,
    ) -> Result<Self, SearchIndexError> {
        let credentials = match resolver.resolve() {
            Ok(creds) => Some(creds),
            Err(SearchIndexError::NotConfigured) => None,
            Err(e) => return Err(e),
        };
        Self::new(credentials, config)
    }

    /// Scheme used for requests other than connection verification.
    pub fn auth_scheme(&self) -> AuthScheme {
        if self.use_api_key_header.load(Ordering::Relaxed) {
            AuthScheme::ApiKeyHeader
        } else {
            AuthScheme::Bearer
        }
    }

    fn remember_scheme(&self, scheme: AuthScheme) {
        self.use_api_key_header
            .store(scheme == AuthScheme::ApiKeyHeader, Ordering::Relaxed);
    }

    fn credentials(&self) -> Result<&ServiceCredentials, SearchIndexError> {
        self.credentials
            .as_ref()
            .ok_or(SearchIndexError::NotConfigured)
    }

    /// Build a request carrying the admin key in the given scheme.
    fn request(
        &self,
        creds: &ServiceCredentials,
        method: Method,
        path: &str,
        scheme: AuthScheme,
        timeout: Duration,
    ) -> RequestBuilder {
        let builder = self
            .client
            .request(method, creds.endpoint(path))
            .timeout(timeout);

        match scheme {
            AuthScheme::Bearer => builder.bearer_auth(creds.admin_key()),
            AuthScheme::ApiKeyHeader => {
                builder.header(self.config.api_key_header.as_str(), creds.admin_key())
            }
        }
    }

    fn encode<T: Serialize + ?Sized>(body: &T) -> Result<Vec<u8>, SearchIndexError> {
        serde_json::to_vec(body).map_err(|e| SearchIndexError::serialization(e.to_string()))
    }

    async fn send(
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<Response, SearchIndexError> {
        builder.send().await.map_err(|e| {
            error!(operation, error = %e, "Request to Meilisearch failed");
            SearchIndexError::transport(e.to_string())
        })
    }

    async fn verify_with(
        &self,
        creds: &ServiceCredentials,
        scheme: AuthScheme,
    ) -> Result<Response, SearchIndexError> {
        let builder = self.request(
            creds,
            Method::GET,
            "/indexes",
            scheme,
            self.config.verify_timeout,
        );
        Self::send(builder, "verify_connection").await
    }

    /// Send one authenticated request with the remembered scheme.
    ///
    /// A 401 answer is retried once with the other scheme. If the retry is
    /// not rejected with 401 too, that scheme is remembered. The last
    /// response is returned either way for the caller's status check.
    async fn dispatch(
        &self,
        creds: &ServiceCredentials,
        method: Method,
        path: &str,
        timeout: Duration,
        body: Option<&[u8]>,
        operation: &'static str,
    ) -> Result<Response, SearchIndexError> {
        let scheme = self.auth_scheme();
        let response = self
            .send_with(creds, method.clone(), path, scheme, timeout, body, operation)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let alternate = scheme.alternate();
        warn!(
            operation,
            rejected = %scheme,
            retry = %alternate,
            "Authentication rejected, retrying with the other scheme"
        );

        let response = self
            .send_with(creds, method, path, alternate, timeout, body, operation)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            self.remember_scheme(alternate);
            info!(operation, scheme = %alternate, "Switched authentication scheme");
        }
        Ok(response)
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_with(
        &self,
        creds: &ServiceCredentials,
        method: Method,
        path: &str,
        scheme: AuthScheme,
        timeout: Duration,
        body: Option<&[u8]>,
        operation: &'static str,
    ) -> Result<Response, SearchIndexError> {
        let mut builder = self.request(creds, method, path, scheme, timeout);
        if let Some(bytes) = body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.to_vec());
        }
        Self::send(builder, operation).await
    }
}

#[async_trait]
impl SearchIndexProvider for MeilisearchProvider {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn host(&self) -> &str {
        self.credentials
            .as_ref()
            .map(ServiceCredentials::host)
            .unwrap_or_default()
    }

    async fn verify_connection(&self) -> Result<AuthScheme, SearchIndexError> {
        let creds = self.credentials()?;

        let response = self.verify_with(creds, AuthScheme::Bearer).await?;
        let status = response.status();
        if status.is_success() {
            self.remember_scheme(AuthScheme::Bearer);
            debug!(host = %creds.host(), "Bearer authentication accepted");
            return Ok(AuthScheme::Bearer);
        }

        if status != StatusCode::UNAUTHORIZED {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Connection verification failed");
            return Err(SearchIndexError::rejected(status.as_u16(), error_body));
        }

        warn!(
            header = %self.config.api_key_header,
            "Bearer authentication rejected, retrying with API key header"
        );

        let response = self.verify_with(creds, AuthScheme::ApiKeyHeader).await?;
        let status = response.status();
        if status.is_success() {
            self.remember_scheme(AuthScheme::ApiKeyHeader);
            info!(
                host = %creds.host(),
                header = %self.config.api_key_header,
                "API key header authentication accepted"
            );
            return Ok(AuthScheme::ApiKeyHeader);
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, "Both authentication schemes rejected");
        Err(SearchIndexError::authentication(status.as_u16(), error_body))
    }

    async fn ensure_index(&self, index_uid: &str, primary_key: &str) {
        let creds = match self.credentials() {
            Ok(creds) => creds,
            Err(_) => {
                debug!(index_uid, "Skipping index creation, Meilisearch not configured");
                return;
            }
        };

        let body = match Self::encode(&json!({ "uid": index_uid, "primaryKey": primary_key })) {
            Ok(body) => body,
            Err(e) => {
                debug!(index_uid, error = %e, "Could not build index creation request");
                return;
            }
        };

        let sent = self
            .dispatch(
                creds,
                Method::POST,
                "/indexes",
                self.config.create_index_timeout,
                Some(body.as_slice()),
                "ensure_index",
            )
            .await;
        match sent {
            Ok(response) if response.status().is_success() => {
                debug!(index_uid, primary_key, "Index creation enqueued");
            }
            Ok(response) => {
                let status = response.status();
                let error_body = response.text().await.unwrap_or_default();
                debug!(
                    index_uid,
                    status = %status,
                    body = %error_body,
                    "Index creation not accepted (index may already exist)"
                );
            }
            Err(e) => {
                debug!(index_uid, error = %e, "Index creation request failed");
            }
        }
    }

    async fn upsert_documents(
        &self,
        index_uid: &str,
        documents: &[IndexDocument],
    ) -> Result<(), SearchIndexError> {
        let creds = self.credentials()?;
        utils::validate_index_uid(index_uid)?;
        if documents.is_empty() {
            return Err(SearchIndexError::validation(
                "At least one document must be provided",
            ));
        }

        let path = format!("/indexes/{}/documents", index_uid);
        let body = Self::encode(documents)?;
        let response = self
            .dispatch(
                creds,
                Method::POST,
                &path,
                self.config.upsert_timeout,
                Some(body.as_slice()),
                "upsert_documents",
            )
            .await?;
        let status = response.status();
        if !utils::is_write_accepted(status) {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                index_uid,
                count = documents.len(),
                status = %status,
                body = %error_body,
                "Document upsert failed"
            );
            return Err(SearchIndexError::rejected(status.as_u16(), error_body));
        }

        debug!(index_uid, count = documents.len(), "Documents upserted");
        Ok(())
    }

    async fn delete_documents(
        &self,
        index_uid: &str,
        ids: &[String],
    ) -> Result<(), SearchIndexError> {
        let creds = self.credentials()?;
        utils::validate_index_uid(index_uid)?;
        if ids.is_empty() {
            return Err(SearchIndexError::validation(
                "At least one document id must be provided",
            ));
        }

        let path = format!("/indexes/{}/documents/delete-batch", index_uid);
        let body = Self::encode(ids)?;
        let response = self
            .dispatch(
                creds,
                Method::POST,
                &path,
                self.config.delete_timeout,
                Some(body.as_slice()),
                "delete_documents",
            )
            .await?;
        let status = response.status();
        if !utils::is_write_accepted(status) {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                index_uid,
                count = ids.len(),
                status = %status,
                body = %error_body,
                "Document deletion failed"
            );
            return Err(SearchIndexError::rejected(status.as_u16(), error_body));
        }

        debug!(index_uid, count = ids.len(), "Documents deleted");
        Ok(())
    }

    async fn configure_index_settings(
        &self,
        index_uid: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        let creds = self.credentials()?;
        utils::validate_index_uid(index_uid)?;

        let path = format!("/indexes/{}/settings", index_uid);
        let body = Self::encode(settings)?;
        let response = self
            .dispatch(
                creds,
                Method::PATCH,
                &path,
                self.config.settings_timeout,
                Some(body.as_slice()),
                "configure_index_settings",
            )
            .await?;
        let status = response.status();
        if !utils::is_settings_accepted(status) {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                index_uid,
                status = %status,
                body = %error_body,
                "Index settings update failed"
            );
            return Err(SearchIndexError::rejected(status.as_u16(), error_body));
        }

        info!(index_uid, "Index settings configured");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let creds = self.credentials()?;

        let response = self
            .dispatch(
                creds,
                Method::GET,
                "/health",
                self.config.health_timeout,
                None,
                "health_check",
            )
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Health check returned non-success status");
            return Ok(false);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SearchIndexError::transport(e.to_string()))?;
        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Health check body is not JSON");
                return Ok(false);
            }
        };
        let available = body.get("status").and_then(Value::as_str) == Some("available");

        debug!(available, "Health check completed");
        Ok(available)
    }
}
