//! Session authentication middleware for gateway-owned routes

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, Uri};
use axum::middleware::Next;
use axum::response::Response;

use crate::gateway::headers::parse_cookies;
use crate::gateway::session::SessionEvidence;
use crate::gateway::state::GatewayState;

/// Axum middleware: validate the session, inject [`UserContext`] into
/// request extensions, or render the auth error and stop.
///
/// [`UserContext`]: crate::gateway::session::UserContext
pub async fn session_auth(
    State(state): State<GatewayState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let evidence = evidence_from(request.method(), request.uri(), request.headers());

    match state.validator.validate(&evidence).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(error) => {
            tracing::warn!(path = evidence.path, kind = %error.kind(), "session validation failed");
            state.respond.error(&error)
        }
    }
}

/// Extract identity evidence from request parts; header names lowercased.
pub fn evidence_from(method: &Method, uri: &Uri, headers: &HeaderMap) -> SessionEvidence {
    let header_map = lowercase_headers(headers);
    let cookies = header_map
        .get("cookie")
        .map(|raw| parse_cookies(raw))
        .unwrap_or_default();

    SessionEvidence {
        headers: header_map,
        cookies,
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

/// Collect headers into a lowercased-name map, skipping non-UTF-8 values.
pub fn lowercase_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}
