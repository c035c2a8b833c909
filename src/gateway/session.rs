//! Session validation
//!
//! Produces an authenticated [`UserContext`] or an auth-family error,
//! independent of transport. The demo validator always succeeds; the trait
//! contract and the error taxonomy stay intact so a real identity-provider
//! implementation is a drop-in replacement.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::ApiError;

/// Authenticated identity for exactly one request; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub user_role: String,
    /// Order preserved for display; semantically order-insignificant.
    pub permissions: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl UserContext {
    /// Session provider recorded by the validator, `"unknown"` if absent.
    pub fn provider(&self) -> &str {
        self.metadata.get("provider").map_or("unknown", |p| p)
    }
}

/// Identity evidence extracted from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct SessionEvidence {
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub method: String,
    pub path: String,
}

/// Validates request identity evidence.
///
/// Implementations must be pure with respect to their inputs: same evidence,
/// same result, no global state mutated. Failures are restricted to the auth
/// error family (`MissingToken`, `InvalidToken`, `SessionExpired`,
/// `AuthServiceError`).
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, evidence: &SessionEvidence) -> Result<UserContext, ApiError>;
}

/// Demo validator: unconditionally authenticates a fixed user.
pub struct StaticSessionValidator;

#[async_trait]
impl SessionValidator for StaticSessionValidator {
    async fn validate(&self, _evidence: &SessionEvidence) -> Result<UserContext, ApiError> {
        Ok(UserContext {
            user_id: "default-user".to_string(),
            user_role: "user".to_string(),
            permissions: vec!["read:transactions".to_string()],
            metadata: HashMap::from([("provider".to_string(), "gateway".to_string())]),
        })
    }
}
