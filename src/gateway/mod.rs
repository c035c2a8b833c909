//! Gateway service
//!
//! Authenticates inbound requests, rewrites headers, and reverse-proxies an
//! explicit allow-list of routes to upstream services. Per-request pipeline:
//!
//! ```text
//! Received -> Authenticating -> (Denied | Authenticated)
//!          -> RouteMatching   -> (Rejected | Forwarding) -> Completed
//! ```
//!
//! Two route spaces are kept structurally distinct: a small fixed set of
//! gateway-owned endpoints (`/_health`, `/_whoami`) that never enter the
//! proxy, and the default-deny service space handled by the pipeline. There
//! is no catch-all proxy; an unlisted path is rejected before any upstream
//! contact.

pub mod headers;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use tokio::net::TcpListener;

use crate::config::GatewayServiceConfig;
use crate::errors::{ApiError, ErrorMappings};
use crate::respond::Respond;
use middleware::{evidence_from, session_auth};
use proxy::{HttpUpstream, UpstreamResponse, build_upstream_request};
use routes::match_route;
use session::{StaticSessionValidator, UserContext};
use state::GatewayState;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// Response headers the server re-derives from the proxied body.
const DROPPED_RESPONSE: [&str; 3] = ["content-length", "transfer-encoding", "connection"];

/// The ordered pipeline for the proxied route space.
///
/// Ordering is security-critical: session validation runs before route
/// matching, and no upstream is contacted unless both pass.
async fn pipeline_handler(State(state): State<GatewayState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    // Authenticating
    let evidence = evidence_from(&parts.method, &parts.uri, &parts.headers);
    let user = match state.validator.validate(&evidence).await {
        Ok(user) => user,
        Err(error) => {
            // Denied. Never retried.
            tracing::warn!(path = evidence.path, kind = %error.kind(), "gateway denied request");
            return state.respond.error(&error);
        }
    };

    // RouteMatching: default-deny, expected traffic shape on miss
    let Some(matched) = match_route(&state.services, &evidence.path) else {
        tracing::debug!(path = evidence.path, "no allow-list entry, rejecting");
        return state.respond.error(&ApiError::RouteNotFound {
            path: evidence.path,
        });
    };

    // Forwarding
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(_) => {
            return state
                .respond
                .error(&ApiError::invalid_input("Failed to read request body", None));
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());

    let outbound = build_upstream_request(
        matched.upstream,
        parts.method.as_str(),
        path_and_query,
        &evidence.headers,
        body,
        &user,
        &state.headers,
    );

    let request_id = outbound
        .headers
        .get(&state.headers.inject_to_service.request_id)
        .cloned()
        .unwrap_or_default();
    tracing::info!(
        service = matched.service,
        path = path_and_query,
        request_id,
        "forwarding request"
    );

    match state.upstream.send(outbound).await {
        Ok(upstream_response) => upstream_to_response(upstream_response),
        Err(error) => state.respond.error(&error),
    }
}

/// Pass the upstream response back unmodified.
fn upstream_to_response(upstream: UpstreamResponse) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = Response::builder().status(status);
    for (name, value) in &upstream.headers {
        if DROPPED_RESPONSE.contains(&name.as_str()) {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(upstream.body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

#[derive(serde::Serialize)]
struct GatewayHealth {
    status: &'static str,
    timestamp_ms: i64,
    version: &'static str,
    services: std::collections::BTreeMap<String, &'static str>,
}

/// GET /_health - gateway-owned, unauthenticated.
async fn health(State(state): State<GatewayState>) -> Response {
    let services = state
        .services
        .iter()
        .map(|(name, service)| {
            (
                name.clone(),
                if service.enabled { "enabled" } else { "disabled" },
            )
        })
        .collect();

    state.respond.success(&GatewayHealth {
        status: "healthy",
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
        version: env!("CARGO_PKG_VERSION"),
        services,
    })
}

/// GET /_whoami - gateway-owned, behind session auth.
async fn whoami(State(state): State<GatewayState>, Extension(user): Extension<UserContext>) -> Response {
    state.respond.success(&serde_json::json!({
        "user": {
            "userId": user.user_id,
            "userRole": user.user_role,
            "permissions": user.permissions,
        },
        "provider": user.provider(),
        "authenticated": true,
    }))
}

/// Build the gateway router: owned endpoints merged in front of the
/// default-deny pipeline fallback.
pub fn router(state: GatewayState) -> Router {
    let protected = Router::new()
        .route("/_whoami", get(whoami))
        .route_layer(from_fn_with_state(state.clone(), session_auth));

    let gateway_owned = Router::new().route("/_health", get(health)).merge(protected);

    Router::new()
        .merge(gateway_owned)
        .fallback(pipeline_handler)
        .with_state(state)
}

/// Start the gateway server; drains in-flight requests on shutdown.
pub async fn run_server<S>(config: &GatewayServiceConfig, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    config
        .headers
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid gateway header config: {}", e))?;

    let state = GatewayState::new(
        Arc::new(StaticSessionValidator),
        Arc::new(HttpUpstream::new(
            "upstream",
            Duration::from_millis(config.upstream_timeout_ms),
        )),
        config.services.clone(),
        config.headers.clone(),
        Respond::new(ErrorMappings::gateway()),
    );

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Gateway stopped");
    Ok(())
}
