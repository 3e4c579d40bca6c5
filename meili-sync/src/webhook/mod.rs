//! Task webhook HTTP server.
//!
//! The search service can call back when an asynchronous task finishes. The
//! endpoint is public and unauthenticated; it only logs and acknowledges.

pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

/// Path of the task callback endpoint.
pub const TASK_WEBHOOK_PATH: &str = "/meili/task-webhook";

/// Create the Axum application router with all routes.
pub fn create_app() -> Router {
    Router::new()
        .route(TASK_WEBHOOK_PATH, post(handlers::task_webhook))
        .route("/health", get(handlers::health_check))
}

/// Serve the webhook on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, path = TASK_WEBHOOK_PATH, "Webhook server listening");

    axum::serve(listener, create_app())
        .with_graceful_shutdown(shutdown)
        .await
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn run_server(
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, shutdown).await
}
