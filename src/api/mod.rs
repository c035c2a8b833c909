//! Core API service
//!
//! JSON endpoints over the transactions store. All fallible paths flow
//! through the repository wrappers and render via [`Respond`], so clients
//! only ever see the stable `{"error", "code"}` shape on failure.

use std::future::Future;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{Next, from_fn};
use axum::routing::{get, post};
use axum::{Router, response::IntoResponse, response::Response};
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::config::ApiServiceConfig;
use crate::db::Database;
use crate::errors::ErrorMappings;
use crate::respond::Respond;
use crate::transactions::{TransactionsRepository, handlers};

/// Shared Core API state; cheap to clone per request.
#[derive(Clone)]
pub struct ApiState {
    pub repo: TransactionsRepository,
    pub respond: Respond,
    pub db: Database,
}

impl ApiState {
    pub fn new(db: Database) -> Self {
        Self {
            repo: TransactionsRepository::new(db.pool().clone()),
            respond: Respond::new(ErrorMappings::defaults()),
            db,
        }
    }
}

/// Build the Core API router.
pub fn router(state: ApiState) -> Router {
    let transactions = Router::new()
        .route("/", post(handlers::create_transaction))
        .route("/", get(handlers::list_transactions))
        .route("/{id}", get(handlers::get_transaction));

    Router::new()
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1/transactions", transactions)
        .layer(from_fn(request_context))
        .with_state(state)
}

/// Gateway-injected request id, if the request came through the gateway.
fn request_id_from(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-request-id").and_then(|v| v.to_str().ok())
}

/// Wrap every request in a span carrying the request id, so fault logs from
/// the repository layer correlate with the gateway's forwarding logs.
async fn request_context(request: Request, next: Next) -> Response {
    let request_id = request_id_from(request.headers())
        .unwrap_or("none")
        .to_string();
    let span = tracing::info_span!(
        "request",
        request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    next.run(request).instrument(span).await
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_ms: i64,
}

/// Health check: pings the store, exposes no internal detail.
async fn health_check(State(state): State<ApiState>) -> Response {
    let now_ms = chrono::Utc::now().timestamp_millis();
    match state.db.health_check().await {
        Ok(()) => Json(HealthResponse {
            status: "healthy",
            timestamp_ms: now_ms,
        })
        .into_response(),
        Err(fault) => {
            tracing::error!(error = %fault, "health check: store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    timestamp_ms: now_ms,
                }),
            )
                .into_response()
        }
    }
}

/// Start the Core API server; drains in-flight requests on shutdown.
pub async fn run_server<S>(
    config: &ApiServiceConfig,
    db: Database,
    shutdown: S,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = router(ApiState::new(db));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr, "Core API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Core API stopped");
    Ok(())
}
