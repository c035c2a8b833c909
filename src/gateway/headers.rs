//! Header transformation engine
//!
//! Pure functions computing which inbound headers must be stripped (spoofing
//! prevention) and which must be injected (identity/context propagation)
//! before a request is forwarded upstream. The combined transformation is a
//! total function: it never fails.

use std::collections::HashMap;

use rand::Rng;

use crate::config::InjectHeaders;
use crate::gateway::session::UserContext;

/// Strip and inject sets for one forwarded request.
#[derive(Debug, Clone)]
pub struct HeaderTransformations {
    pub headers_to_add: HashMap<String, String>,
    pub headers_to_remove: Vec<String>,
}

/// Headers matching any strip pattern, each listed once.
///
/// A pattern ending in `*` matches by case-insensitive prefix on the part
/// before the `*`; otherwise the match is exact and case-insensitive. Only
/// the single `prefix*` wildcard form exists; this is not a glob engine.
pub fn compute_headers_to_strip(
    headers: &HashMap<String, String>,
    patterns: &[String],
) -> Vec<String> {
    let mut to_remove = Vec::new();

    for name in headers.keys() {
        let lower = name.to_ascii_lowercase();
        for pattern in patterns {
            let matched = match pattern.strip_suffix('*') {
                Some(prefix) => lower.starts_with(&prefix.to_ascii_lowercase()),
                None => lower == pattern.to_ascii_lowercase(),
            };
            if matched {
                to_remove.push(name.clone());
                break;
            }
        }
    }

    to_remove
}

/// Build exactly the five injected headers from the authenticated user.
///
/// The request id is reused from an inbound `x-request-id` if present, else
/// freshly generated; forwarded-for comes from `x-forwarded-for` or
/// `cf-connecting-ip`, else `"unknown"`. Expects lowercased header names.
pub fn compute_headers_to_inject(
    user: &UserContext,
    config: &InjectHeaders,
    original_headers: &HashMap<String, String>,
) -> HashMap<String, String> {
    let request_id = original_headers
        .get("x-request-id")
        .cloned()
        .unwrap_or_else(generate_request_id);
    let forwarded_for = original_headers
        .get("x-forwarded-for")
        .or_else(|| original_headers.get("cf-connecting-ip"))
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());

    HashMap::from([
        (config.user_id.clone(), user.user_id.clone()),
        (config.user_role.clone(), user.user_role.clone()),
        (config.permissions.clone(), user.permissions.join(",")),
        (config.request_id.clone(), request_id),
        (config.forwarded_for.clone(), forwarded_for),
    ])
}

/// Combined strip + inject computation. Total: never fails.
pub fn compute_header_transformations(
    user: &UserContext,
    strip_patterns: &[String],
    inject_config: &InjectHeaders,
    original_headers: &HashMap<String, String>,
) -> HeaderTransformations {
    HeaderTransformations {
        headers_to_remove: compute_headers_to_strip(original_headers, strip_patterns),
        headers_to_add: compute_headers_to_inject(user, inject_config, original_headers),
    }
}

/// Pure half of request-id generation, unit-testable with fixed inputs.
pub fn format_request_id(timestamp_ms: i64, suffix: &str) -> String {
    format!("gw_{}_{}", timestamp_ms, suffix)
}

/// Fresh request id: millisecond timestamp plus random base36 suffix.
///
/// Unique per call with overwhelming probability; cryptographic uniqueness
/// is not required.
pub fn generate_request_id() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..13)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format_request_id(chrono::Utc::now().timestamp_millis(), &suffix)
}

/// Parse a `cookie` header into name/value pairs. Values may contain `=`;
/// a valueless cookie (`foo`) is kept with an empty value.
pub fn parse_cookies(cookie_header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        let (name, value) = cookie.split_once('=').unwrap_or((cookie, ""));
        if !name.is_empty() {
            cookies.insert(name.to_string(), value.to_string());
        }
    }
    cookies
}
