//! Integration tests for the bulk reconciler and lifecycle hooks.
//!
//! These tests use the real `MeilisearchProvider` against an in-process fake
//! search service, with an in-memory record source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use meili_sync::{
    BulkReconciler, LotAdapter, ReconcileOutcome, ReconcilerConfig, Severity, SyncHooks,
};
use meili_sync_repository::{
    MeilisearchConfig, MeilisearchProvider, RecordSource, RecordSourceError, SearchIndexProvider,
    ServiceCredentials,
};
use meili_sync_shared::{LotRecord, ProductRef};
use serde_json::Value;

struct FakeMeilisearch {
    requests: Mutex<Vec<(Method, String, Value)>>,
    upserts: AtomicUsize,
    /// 1-based upsert requests answered with 500.
    failing_upserts: Vec<usize>,
    /// Answer 401 unless the key comes in `X-Meili-API-Key`.
    api_key_header_only: bool,
}

impl FakeMeilisearch {
    fn paths(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(method, path, _)| (method.clone(), path.clone()))
            .collect()
    }

    fn bodies_for(&self, path: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p, _)| p == path)
            .map(|(_, _, body)| body.clone())
            .collect()
    }
}

async fn handle(
    State(fake): State<Arc<FakeMeilisearch>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    fake.requests
        .lock()
        .unwrap()
        .push((method.clone(), path.clone(), body));

    if fake.api_key_header_only && !headers.contains_key("x-meili-api-key") {
        return (StatusCode::UNAUTHORIZED, "missing_authorization_header".to_string());
    }

    if method == Method::POST && path.ends_with("/documents") {
        let n = fake.upserts.fetch_add(1, Ordering::SeqCst) + 1;
        if fake.failing_upserts.contains(&n) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        }
    }
    if method == Method::POST && path == "/indexes" {
        return (StatusCode::CONFLICT, "index_already_exists".to_string());
    }

    (StatusCode::ACCEPTED, r#"{"taskUid": 1}"#.to_string())
}

async fn spawn_fake(failing_upserts: Vec<usize>) -> (Arc<dyn SearchIndexProvider>, Arc<FakeMeilisearch>) {
    spawn_fake_with(failing_upserts, false).await
}

async fn spawn_fake_with(
    failing_upserts: Vec<usize>,
    api_key_header_only: bool,
) -> (Arc<dyn SearchIndexProvider>, Arc<FakeMeilisearch>) {
    let fake = Arc::new(FakeMeilisearch {
        requests: Mutex::new(Vec::new()),
        upserts: AtomicUsize::new(0),
        failing_upserts,
        api_key_header_only,
    });
    let app = Router::new().fallback(handle).with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let creds = ServiceCredentials::new(format!("http://{}", addr), "master-key").unwrap();
    let provider = MeilisearchProvider::new(Some(creds), MeilisearchConfig::default()).unwrap();
    (Arc::new(provider), fake)
}

struct MemoryLots(Vec<LotRecord>);

#[async_trait]
impl RecordSource for MemoryLots {
    type Record = LotRecord;

    async fn fetch_all(&self) -> Result<Vec<LotRecord>, RecordSourceError> {
        Ok(self.0.clone())
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<LotRecord>, RecordSourceError> {
        Ok(self
            .0
            .iter()
            .filter(|lot| ids.contains(&lot.id))
            .cloned()
            .collect())
    }
}

fn lots(count: i64) -> MemoryLots {
    let widget = ProductRef::new(1, Some("Widget".to_string()), Some("WID".to_string()));
    MemoryLots(
        (1..=count)
            .map(|id| LotRecord::new(id, format!("LOT-{}/A", id)).with_product(widget.clone()))
            .collect(),
    )
}

fn fast_config(batch_size: usize) -> ReconcilerConfig {
    ReconcilerConfig::default()
        .with_batch_size(batch_size)
        .with_batch_delay(Duration::from_millis(5))
}

#[tokio::test]
async fn test_bulk_reindex_over_http() {
    let (provider, fake) = spawn_fake(Vec::new()).await;
    let mut reconciler = BulkReconciler::with_config(
        Arc::new(LotAdapter),
        Arc::new(lots(25)),
        provider,
        fast_config(10),
    );

    let report = reconciler.run().await;

    assert_eq!(report.outcome, ReconcileOutcome::Complete);
    assert_eq!((report.indexed, report.failed, report.batches), (25, 0, 3));
    assert_eq!(
        fake.paths(),
        vec![
            (Method::POST, "/indexes".to_string()),
            (Method::PATCH, "/indexes/lots/settings".to_string()),
            (Method::POST, "/indexes/lots/documents".to_string()),
            (Method::POST, "/indexes/lots/documents".to_string()),
            (Method::POST, "/indexes/lots/documents".to_string()),
        ]
    );

    let batches = fake.bodies_for("/indexes/lots/documents");
    let sizes: Vec<usize> = batches
        .iter()
        .map(|b| b.as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(batches[0][0]["id"], "1");
    assert_eq!(batches[0][0]["lot_name_digits"], "1");
    assert_eq!(batches[2][4]["searchable_text"], "LOT-25/A WID");

    let settings = &fake.bodies_for("/indexes/lots/settings")[0];
    assert_eq!(settings["separatorTokens"][1], "/");

    let notification = report.notification();
    assert_eq!(notification.severity, Severity::Success);
    assert_eq!(
        notification.message,
        "Successfully indexed 25 lots to Meilisearch."
    );
}

#[tokio::test]
async fn test_bulk_reindex_isolates_failed_batch() {
    let (provider, fake) = spawn_fake(vec![2]).await;
    let mut reconciler = BulkReconciler::with_config(
        Arc::new(LotAdapter),
        Arc::new(lots(25)),
        provider,
        fast_config(10),
    );

    let report = reconciler.run().await;

    assert_eq!(report.outcome, ReconcileOutcome::Partial);
    assert_eq!(report.indexed, 15);
    assert_eq!(report.failed, 10);
    assert_eq!(fake.bodies_for("/indexes/lots/documents").len(), 3);
    assert_eq!(
        report.notification().message,
        "Successfully indexed 15 lots to Meilisearch. Failed to index 10 lots (check logs for details)."
    );
}

#[tokio::test]
async fn test_bulk_reindex_empty_corpus_sends_nothing() {
    let (provider, fake) = spawn_fake(Vec::new()).await;
    let mut reconciler =
        BulkReconciler::new(Arc::new(LotAdapter), Arc::new(MemoryLots(Vec::new())), provider);

    let report = reconciler.run().await;

    assert_eq!(report.outcome, ReconcileOutcome::Empty);
    assert!(fake.paths().is_empty());
}

#[tokio::test]
async fn test_hooks_over_http() {
    let (provider, fake) = spawn_fake(Vec::new()).await;
    let hooks = SyncHooks::new(Arc::new(LotAdapter), provider);
    let source = lots(2);

    assert!(hooks.after_create(&source.0).await);
    assert!(hooks.before_delete(&[LotRecord::with_id(77)]).await);

    assert_eq!(
        fake.paths(),
        vec![
            (Method::POST, "/indexes".to_string()),
            (Method::POST, "/indexes/lots/documents".to_string()),
            (Method::POST, "/indexes/lots/documents/delete-batch".to_string()),
        ]
    );
    assert_eq!(
        fake.bodies_for("/indexes/lots/documents/delete-batch")[0],
        serde_json::json!(["77"])
    );
}

#[tokio::test]
async fn test_hooks_and_reindex_work_with_api_key_header_only_service() {
    let (provider, fake) = spawn_fake_with(Vec::new(), true).await;
    let hooks = SyncHooks::new(Arc::new(LotAdapter), provider.clone());

    assert!(hooks.after_create(&lots(1).0).await);

    let mut reconciler = BulkReconciler::with_config(
        Arc::new(LotAdapter),
        Arc::new(lots(3)),
        provider,
        fast_config(10),
    );
    let report = reconciler.run().await;

    assert_eq!(report.outcome, ReconcileOutcome::Complete);
    assert_eq!((report.indexed, report.failed), (3, 0));
    // Only the very first request is sent with a Bearer token.
    assert_eq!(
        fake.paths(),
        vec![
            (Method::POST, "/indexes".to_string()),
            (Method::POST, "/indexes".to_string()),
            (Method::POST, "/indexes/lots/documents".to_string()),
            (Method::POST, "/indexes".to_string()),
            (Method::PATCH, "/indexes/lots/settings".to_string()),
            (Method::POST, "/indexes/lots/documents".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_hooks_swallow_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let creds = ServiceCredentials::new(format!("http://{}", addr), "key").unwrap();
    let provider = MeilisearchProvider::new(Some(creds), MeilisearchConfig::default()).unwrap();
    let hooks = SyncHooks::new(Arc::new(LotAdapter), Arc::new(provider));

    assert!(!hooks.after_update(&lots(1).0).await);
    assert!(!hooks.before_delete(&lots(1).0).await);
}

#[tokio::test]
async fn test_unconfigured_provider_skips_all_work() {
    let provider: Arc<dyn SearchIndexProvider> =
        Arc::new(MeilisearchProvider::new(None, MeilisearchConfig::default()).unwrap());
    let hooks = SyncHooks::new(Arc::new(LotAdapter), provider.clone());
    let mut reconciler = BulkReconciler::new(Arc::new(LotAdapter), Arc::new(lots(3)), provider);

    assert!(!hooks.after_create(&lots(1).0).await);
    let report = reconciler.run().await;

    assert_eq!(report.outcome, ReconcileOutcome::NotConfigured);
    assert_eq!(report.notification().severity, Severity::Danger);
}
