//! Dependency initialization and wiring for the sync service.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use meili_sync_repository::{
    ConfigResolver, EnvParameterStore, MeilisearchConfig, MeilisearchProvider,
    PostgresLotSource, PostgresParameterStore, SearchIndexError, SearchIndexProvider,
    DEFAULT_API_KEY_HEADER,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::adapter::LotAdapter;
use crate::hooks::SyncHooks;
use crate::reconciler::{
    BulkReconciler, ReconcilerConfig, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE,
};
use crate::IndexingError;

/// Default bind address of the webhook server.
pub const DEFAULT_WEBHOOK_ADDR: &str = "0.0.0.0:8080";

/// Maximum number of pooled database connections.
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 5;

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub api_key_header: String,
    pub reconciler: ReconcilerConfig,
    pub webhook_addr: SocketAddr,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL URL of the host record store (optional)
    /// - `MEILI_API_KEY_HEADER`: Fallback authentication header (default: X-Meili-API-Key)
    /// - `BULK_BATCH_SIZE`: Records per bulk upsert request (default: 500)
    /// - `BULK_BATCH_DELAY_MS`: Pause between bulk batches in milliseconds (default: 500)
    /// - `WEBHOOK_ADDR`: Webhook server bind address (default: 0.0.0.0:8080)
    ///
    /// `MEILI_HOST` and `MEILI_ADMIN_KEY` are read by the credential resolver.
    pub fn from_env() -> Result<Self, IndexingError> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let api_key_header = env::var("MEILI_API_KEY_HEADER")
            .ok()
            .filter(|header| !header.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string());
        let batch_size = env::var("BULK_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let batch_delay = env::var("BULK_BATCH_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BATCH_DELAY);
        let webhook_addr = env::var("WEBHOOK_ADDR")
            .unwrap_or_else(|_| DEFAULT_WEBHOOK_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| IndexingError::config(format!("Invalid WEBHOOK_ADDR: {}", e)))?;

        Ok(Self {
            database_url,
            api_key_header,
            reconciler: ReconcilerConfig::default()
                .with_batch_size(batch_size)
                .with_batch_delay(batch_delay),
            webhook_addr,
        })
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub settings: Settings,
    /// Search service client. Unconfigured when credentials are missing.
    pub provider: Arc<dyn SearchIndexProvider>,
    /// Host record store, if `DATABASE_URL` is set.
    pub pool: Option<PgPool>,
    pub lot_adapter: Arc<LotAdapter>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// Credentials are resolved from the database's configuration parameters
    /// first, then from `MEILI_HOST` / `MEILI_ADMIN_KEY`. Missing credentials
    /// are not an error here: the provider is created unconfigured and every
    /// indexing call is skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a setting is malformed or the database is unreachable
    pub async fn new() -> Result<Self, IndexingError> {
        let settings = Settings::from_env()?;

        info!(
            database = settings.database_url.is_some(),
            api_key_header = %settings.api_key_header,
            batch_size = settings.reconciler.batch_size,
            batch_delay_ms = settings.reconciler.batch_delay.as_millis() as u64,
            webhook_addr = %settings.webhook_addr,
            "Initializing dependencies"
        );

        let pool = match &settings.database_url {
            Some(url) => Some(Self::connect_database(url).await?),
            None => {
                warn!("DATABASE_URL not set, record store unavailable");
                None
            }
        };

        let mut resolver = ConfigResolver::new();
        if let Some(pool) = &pool {
            let snapshot = PostgresParameterStore::load(pool).await?;
            resolver = resolver.with_store(Arc::new(snapshot));
        }
        resolver = resolver.with_store(Arc::new(EnvParameterStore::new()));

        let provider = Self::build_provider(&resolver, &settings.api_key_header)?;

        Ok(Self {
            settings,
            provider,
            pool,
            lot_adapter: Arc::new(LotAdapter::new()),
        })
    }

    fn build_provider(
        resolver: &ConfigResolver,
        api_key_header: &str,
    ) -> Result<Arc<dyn SearchIndexProvider>, IndexingError> {
        let config = MeilisearchConfig::default().with_api_key_header(api_key_header);
        let provider = match MeilisearchProvider::from_resolver(resolver, config.clone()) {
            Ok(provider) => provider,
            Err(e @ SearchIndexError::ValidationError(_)) => {
                warn!(error = %e, "Ignoring invalid Meilisearch configuration");
                MeilisearchProvider::new(None, config)?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Arc::new(provider))
    }

    async fn connect_database(url: &str) -> Result<PgPool, IndexingError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_DB_CONNECTIONS)
            .connect(url)
            .await
            .map_err(|e| IndexingError::config(format!("Failed to connect to database: {}", e)))?;

        info!("Database connection established");
        Ok(pool)
    }

    /// The PostgreSQL pool, or a configuration error when none is set up.
    pub fn require_pool(&self) -> Result<&PgPool, IndexingError> {
        self.pool
            .as_ref()
            .ok_or_else(|| IndexingError::config("DATABASE_URL must be set for this command"))
    }

    /// Lifecycle hooks for lots.
    pub fn lot_hooks(&self) -> SyncHooks<LotAdapter> {
        SyncHooks::new(self.lot_adapter.clone(), self.provider.clone())
    }

    /// Bulk reconciler for lots, reading from the database.
    pub fn lot_reconciler(
        &self,
    ) -> Result<BulkReconciler<LotAdapter, PostgresLotSource>, IndexingError> {
        let source = PostgresLotSource::new(self.require_pool()?.clone());
        Ok(BulkReconciler::with_config(
            self.lot_adapter.clone(),
            Arc::new(source),
            self.provider.clone(),
            self.settings.reconciler.clone(),
        ))
    }

    /// Lot record source, reading from the database.
    pub fn lot_source(&self) -> Result<PostgresLotSource, IndexingError> {
        Ok(PostgresLotSource::new(self.require_pool()?.clone()))
    }
}
