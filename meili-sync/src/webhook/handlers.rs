use axum::{body::Bytes, http::StatusCode, response::IntoResponse, Json};
use meili_sync_shared::TaskNotification;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Task webhook endpoint.
///
/// Accepts a single JSON object, a JSON array, or newline-delimited JSON (the
/// format the service uses for task callbacks). Each task is logged; nothing
/// else happens.
pub async fn task_webhook(body: Bytes) -> impl IntoResponse {
    let notifications = match parse_notifications(&body) {
        Ok(notifications) => notifications,
        Err(e) => {
            warn!(error = %e, "Rejected malformed task webhook payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": e.to_string() })),
            );
        }
    };

    for notification in &notifications {
        let extra = serde_json::Value::Object(notification.extra.clone());
        info!(
            task_uid = ?notification.task_uid,
            index_uid = ?notification.index_uid,
            status = ?notification.status,
            extra = %extra,
            "Meilisearch task webhook called"
        );
    }

    (StatusCode::OK, Json(json!({ "ok": true })))
}

/// Parse a webhook body into task notifications.
///
/// Fails only when the body is not JSON. Field types are not enforced.
pub fn parse_notifications(body: &[u8]) -> Result<Vec<TaskNotification>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let values = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(value) => vec![value],
        Err(_) => serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(values.into_iter().map(TaskNotification::from_value).collect())
}
