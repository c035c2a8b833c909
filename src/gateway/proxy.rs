//! Upstream forwarding
//!
//! The [`Upstream`] trait is the seam between the pipeline and the network:
//! production forwards over `reqwest` with a configured timeout, tests
//! substitute spies. Connection failures and timeouts surface as
//! `UpstreamUnavailable` (rendered 503), never as raw transport faults.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::HeaderConfig;
use crate::errors::ApiError;
use crate::gateway::headers::compute_header_transformations;
use crate::gateway::session::UserContext;

/// Marker appended to every forwarded request.
pub const VIA_HEADER: &str = "via";
pub const VIA_VALUE: &str = "1.1 finstack-gateway";

/// Outbound request, decoupled from any HTTP client's types.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: String,
    pub url: String,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Upstream response passed back to the caller unmodified.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// One backend service reachable from the gateway.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ApiError>;
}

/// Production upstream over `reqwest` with a hard per-request timeout.
pub struct HttpUpstream {
    client: reqwest::Client,
    service: String,
}

impl HttpUpstream {
    pub fn new(service: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            service: service.into(),
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ApiError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            ApiError::invalid_input(
                format!("Unsupported HTTP method: {}", request.method),
                None,
            )
        })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(|fault| {
            tracing::error!(
                service = %self.service,
                url = %request.url,
                error = %fault,
                "upstream request failed"
            );
            ApiError::UpstreamUnavailable {
                service: self.service.clone(),
                message: fault.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|fault| ApiError::UpstreamUnavailable {
                service: self.service.clone(),
                message: fault.to_string(),
            })?
            .to_vec();

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

// Hop-by-hop and length headers the client library must own.
const DROPPED_OUTBOUND: [&str; 4] = ["host", "content-length", "connection", "transfer-encoding"];

/// Build the rewritten outbound request for a matched route.
///
/// Strips spoofable headers, injects the authenticated identity headers plus
/// the `via` marker, and targets base URL + original path + original query,
/// otherwise unmodified.
pub fn build_upstream_request(
    base_url: &str,
    method: &str,
    path_and_query: &str,
    original_headers: &HashMap<String, String>,
    body: Vec<u8>,
    user: &UserContext,
    header_config: &HeaderConfig,
) -> UpstreamRequest {
    let transformations = compute_header_transformations(
        user,
        &header_config.strip_from_client,
        &header_config.inject_to_service,
        original_headers,
    );

    let mut headers = original_headers.clone();
    for name in &transformations.headers_to_remove {
        headers.remove(&name.to_ascii_lowercase());
    }
    for name in DROPPED_OUTBOUND {
        headers.remove(name);
    }
    for (name, value) in transformations.headers_to_add {
        headers.insert(name.to_ascii_lowercase(), value);
    }
    headers.insert(VIA_HEADER.to_string(), VIA_VALUE.to_string());

    UpstreamRequest {
        method: method.to_string(),
        url: format!("{}{}", base_url.trim_end_matches('/'), path_and_query),
        headers,
        body,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Spy upstream: counts calls, records the last request, returns a
    /// canned response.
    pub struct SpyUpstream {
        calls: AtomicUsize,
        pub last_request: Mutex<Option<UpstreamRequest>>,
        response: UpstreamResponse,
    }

    impl SpyUpstream {
        pub fn returning(status: u16, body: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                response: UpstreamResponse {
                    status,
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                    body: body.as_bytes().to_vec(),
                },
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Upstream for SpyUpstream {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().expect("spy lock") = Some(request);
            Ok(self.response.clone())
        }
    }

    /// Upstream that always fails as unreachable.
    pub struct DownUpstream;

    #[async_trait]
    impl Upstream for DownUpstream {
        async fn send(&self, _request: UpstreamRequest) -> Result<UpstreamResponse, ApiError> {
            Err(ApiError::UpstreamUnavailable {
                service: "api".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn user() -> UserContext {
        UserContext {
            user_id: "default-user".to_string(),
            user_role: "user".to_string(),
            permissions: vec!["read:transactions".to_string()],
            metadata: HashMap::new(),
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_request_targets_path_and_query_unmodified() {
        let request = build_upstream_request(
            "http://localhost:10000/",
            "GET",
            "/api/v1/transactions/123?verbose=1",
            &HashMap::new(),
            Vec::new(),
            &user(),
            &HeaderConfig::default(),
        );
        assert_eq!(
            request.url,
            "http://localhost:10000/api/v1/transactions/123?verbose=1"
        );
        assert_eq!(request.method, "GET");
    }

    #[test]
    fn test_build_request_strips_spoofed_and_injects_identity() {
        let inbound = headers(&[
            ("x-user-id", "spoofed"),
            ("x-internal-auth", "stolen"),
            ("accept", "application/json"),
        ]);
        let request = build_upstream_request(
            "http://localhost:10000",
            "GET",
            "/api/v1/transactions/123",
            &inbound,
            Vec::new(),
            &user(),
            &HeaderConfig::default(),
        );

        // Spoofed identity replaced by the authenticated one.
        assert_eq!(request.headers["x-user-id"], "default-user");
        assert_eq!(request.headers["x-user-role"], "user");
        assert_eq!(request.headers["x-user-permissions"], "read:transactions");
        assert!(!request.headers.contains_key("x-internal-auth"));
        // Untouched caller headers pass through.
        assert_eq!(request.headers["accept"], "application/json");
    }

    #[test]
    fn test_build_request_adds_via_marker() {
        let request = build_upstream_request(
            "http://localhost:10000",
            "GET",
            "/api/v1/transactions/1",
            &HashMap::new(),
            Vec::new(),
            &user(),
            &HeaderConfig::default(),
        );
        assert_eq!(request.headers[VIA_HEADER], VIA_VALUE);
    }

    #[test]
    fn test_build_request_drops_hop_by_hop_headers() {
        let inbound = headers(&[("host", "gateway.local"), ("content-length", "42")]);
        let request = build_upstream_request(
            "http://localhost:10000",
            "POST",
            "/api/v1/transactions",
            &inbound,
            b"{}".to_vec(),
            &user(),
            &HeaderConfig::default(),
        );
        assert!(!request.headers.contains_key("host"));
        assert!(!request.headers.contains_key("content-length"));
        assert_eq!(request.body, b"{}");
    }
}
