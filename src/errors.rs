//! Error taxonomy and HTTP mapping
//!
//! The closed set of error shapes every layer produces, plus the table-driven
//! mapping from error kind to HTTP status and stable machine-readable code.
//!
//! Clients only ever see `{"error": message, "code": code}` with a status from
//! the mapping table. An unmapped kind falls back to a fixed generic 500 so no
//! internal detail can leak.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::http::StatusCode;
use thiserror::Error;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Closed error taxonomy.
///
/// The discriminator string returned by [`ApiError::kind`] uniquely determines
/// which fields are present. New kinds require a mapping-table entry or they
/// render as the generic 500 fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Resource absent. Kind is `{resource}NotFound`, e.g. `TransactionNotFound`.
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Malformed caller input with field-level detail.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Malformed caller input, single-field shorthand.
    #[error("{message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Store-level fault. `operation` names the repository call that failed.
    #[error("database operation {operation} failed: {message}")]
    Database { operation: String, message: String },

    /// Business-rule violation.
    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    MissingToken { message: String },

    #[error("{message}")]
    InvalidToken { message: String },

    #[error("{message}")]
    SessionExpired { message: String },

    /// The authentication backend itself failed; distinct from bad credentials.
    #[error("{message}")]
    AuthService { message: String },

    /// Gateway route not present in any enabled service's allow-list.
    #[error("route {path} not found")]
    RouteNotFound { path: String },

    /// Upstream service unreachable or timed out.
    #[error("upstream {service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// Catch-all for unexpected faults. Never rendered verbatim.
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn invalid_input(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn database(operation: impl Into<String>, fault: impl ToString) -> Self {
        Self::Database {
            operation: operation.into(),
            message: fault.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Discriminator string used for mapping-table lookup.
    pub fn kind(&self) -> Cow<'static, str> {
        match self {
            Self::NotFound { resource, .. } => Cow::Owned(format!("{resource}NotFound")),
            Self::Validation { .. } => Cow::Borrowed("ValidationError"),
            Self::InvalidInput { .. } => Cow::Borrowed("InvalidInput"),
            Self::Database { .. } => Cow::Borrowed("DatabaseError"),
            Self::Conflict { .. } => Cow::Borrowed("ConflictError"),
            Self::MissingToken { .. } => Cow::Borrowed("MissingToken"),
            Self::InvalidToken { .. } => Cow::Borrowed("InvalidToken"),
            Self::SessionExpired { .. } => Cow::Borrowed("SessionExpired"),
            Self::AuthService { .. } => Cow::Borrowed("AuthServiceError"),
            Self::RouteNotFound { .. } => Cow::Borrowed("RouteNotFound"),
            Self::UpstreamUnavailable { .. } => Cow::Borrowed("UpstreamUnavailable"),
            Self::Internal { .. } => Cow::Borrowed("InternalError"),
        }
    }
}

/// Mapping entry: HTTP status, stable code, optional message override.
///
/// A `message` override replaces the error's own message in the response,
/// used where the raw message must not reach clients (e.g. store faults).
#[derive(Debug, Clone)]
pub struct ErrorMapping {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: Option<&'static str>,
}

impl ErrorMapping {
    pub const fn new(status: StatusCode, code: &'static str) -> Self {
        Self {
            status,
            code,
            message: None,
        }
    }

    pub const fn with_message(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code,
            message: Some(message),
        }
    }
}

/// The rendered form of an error: everything the transport layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

/// Fixed fallback for unmapped kinds. Guarantees nothing internal leaks.
const FALLBACK_CODE: &str = "INTERNAL_ERROR";
const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Kind string -> HTTP mapping table.
///
/// Fixed at service startup; never mutated at request time.
#[derive(Debug, Clone)]
pub struct ErrorMappings {
    entries: HashMap<&'static str, ErrorMapping>,
}

impl ErrorMappings {
    /// Domain mappings shared by every service in the stack.
    pub fn defaults() -> Self {
        let mut entries = HashMap::new();

        // Not-found errors
        entries.insert(
            "TransactionNotFound",
            ErrorMapping::new(StatusCode::NOT_FOUND, "TRANSACTION_NOT_FOUND"),
        );
        entries.insert(
            "PortfolioNotFound",
            ErrorMapping::new(StatusCode::NOT_FOUND, "PORTFOLIO_NOT_FOUND"),
        );
        entries.insert(
            "AccountNotFound",
            ErrorMapping::new(StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
        );
        entries.insert(
            "UserNotFound",
            ErrorMapping::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        );
        entries.insert(
            "PriceNotFound",
            ErrorMapping::new(StatusCode::NOT_FOUND, "PRICE_NOT_FOUND"),
        );

        // Validation errors
        entries.insert(
            "ValidationError",
            ErrorMapping::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        );
        entries.insert(
            "InvalidInput",
            ErrorMapping::new(StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        );

        // Business-rule errors
        entries.insert(
            "ConflictError",
            ErrorMapping::new(StatusCode::CONFLICT, "CONFLICT_ERROR"),
        );
        entries.insert(
            "InsufficientFunds",
            ErrorMapping::new(StatusCode::CONFLICT, "INSUFFICIENT_FUNDS"),
        );

        // Store faults: raw message never reaches clients
        entries.insert(
            "DatabaseError",
            ErrorMapping::with_message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Internal server error",
            ),
        );

        Self { entries }
    }

    /// Auth and proxy mappings layered on top of the defaults by the gateway.
    pub fn gateway() -> Self {
        Self::defaults().with_overrides([
            (
                "MissingToken",
                ErrorMapping::new(StatusCode::UNAUTHORIZED, "MISSING_AUTH_TOKEN"),
            ),
            (
                "InvalidToken",
                ErrorMapping::new(StatusCode::UNAUTHORIZED, "INVALID_AUTH_TOKEN"),
            ),
            (
                "SessionExpired",
                ErrorMapping::new(StatusCode::UNAUTHORIZED, "SESSION_EXPIRED"),
            ),
            (
                "AuthServiceError",
                ErrorMapping::new(StatusCode::SERVICE_UNAVAILABLE, "AUTH_SERVICE_UNAVAILABLE"),
            ),
            (
                "RouteNotFound",
                ErrorMapping::new(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND"),
            ),
            (
                "UpstreamUnavailable",
                ErrorMapping::with_message(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Upstream service unavailable",
                ),
            ),
        ])
    }

    /// Merge per-service overrides on top of this table. Later entries win.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, ErrorMapping)>,
    {
        for (kind, mapping) in overrides {
            self.entries.insert(kind, mapping);
        }
        self
    }

    /// Map an error to its transport form.
    ///
    /// Lookup by kind; message precedence is table override, then the error's
    /// own message. Unmapped kinds get the fixed generic 500.
    pub fn map(&self, error: &ApiError) -> MappedError {
        match self.entries.get(error.kind().as_ref()) {
            Some(mapping) => MappedError {
                status: mapping.status,
                code: mapping.code.to_string(),
                message: mapping
                    .message
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
            },
            None => MappedError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: FALLBACK_CODE.to_string(),
                message: FALLBACK_MESSAGE.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kind_is_resource_qualified() {
        let err = ApiError::not_found("Transaction", "123");
        assert_eq!(err.kind(), "TransactionNotFound");
        assert_eq!(err.to_string(), "Transaction with ID 123 not found");
    }

    #[test]
    fn test_transaction_not_found_maps_to_404() {
        let mappings = ErrorMappings::defaults();
        let mapped = mappings.map(&ApiError::not_found("Transaction", "123"));

        assert_eq!(mapped.status, StatusCode::NOT_FOUND);
        assert_eq!(mapped.code, "TRANSACTION_NOT_FOUND");
        assert_eq!(mapped.message, "Transaction with ID 123 not found");
    }

    #[test]
    fn test_database_error_message_is_overridden() {
        let mappings = ErrorMappings::defaults();
        let err = ApiError::database("getTransactionById", "connection refused on 5432");
        let mapped = mappings.map(&err);

        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mapped.code, "DATABASE_ERROR");
        // Raw store detail must never reach the client.
        assert_eq!(mapped.message, "Internal server error");
    }

    #[test]
    fn test_unmapped_kind_falls_back_to_generic_500() {
        let mappings = ErrorMappings::defaults();
        // Internal is deliberately absent from the table.
        let err = ApiError::internal("stack trace with secrets");
        let mapped = mappings.map(&err);

        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mapped.code, "INTERNAL_ERROR");
        assert_eq!(mapped.message, "An unexpected error occurred");
    }

    #[test]
    fn test_unknown_resource_not_found_falls_back() {
        let mappings = ErrorMappings::defaults();
        let err = ApiError::not_found("Widget", "9");
        let mapped = mappings.map(&err);

        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mapped.code, "INTERNAL_ERROR");
        assert!(!mapped.message.contains("Widget"));
    }

    #[test]
    fn test_map_is_idempotent() {
        let mappings = ErrorMappings::gateway();
        let err = ApiError::InvalidToken {
            message: "Invalid or expired token".to_string(),
        };
        let first = mappings.map(&err);
        let second = mappings.map(&err);
        assert_eq!(first, second);
    }

    #[test]
    fn test_gateway_auth_mappings() {
        let mappings = ErrorMappings::gateway();

        let invalid = mappings.map(&ApiError::InvalidToken {
            message: "bad signature".to_string(),
        });
        assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.code, "INVALID_AUTH_TOKEN");

        let down = mappings.map(&ApiError::AuthService {
            message: "identity provider timeout".to_string(),
        });
        assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(down.code, "AUTH_SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_upstream_unavailable_hides_detail() {
        let mappings = ErrorMappings::gateway();
        let err = ApiError::UpstreamUnavailable {
            service: "api".to_string(),
            message: "tcp connect error 10.0.0.3:10000".to_string(),
        };
        let mapped = mappings.map(&err);

        assert_eq!(mapped.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(mapped.code, "SERVICE_UNAVAILABLE");
        assert_eq!(mapped.message, "Upstream service unavailable");
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let mappings = ErrorMappings::defaults().with_overrides([(
            "TransactionNotFound",
            ErrorMapping::new(StatusCode::GONE, "TRANSACTION_GONE"),
        )]);
        let mapped = mappings.map(&ApiError::not_found("Transaction", "1"));
        assert_eq!(mapped.status, StatusCode::GONE);
        assert_eq!(mapped.code, "TRANSACTION_GONE");
    }

    #[test]
    fn test_validation_error_carries_field_detail() {
        let err = ApiError::validation(
            "Validation failed: 1 error(s)",
            vec![FieldError {
                field: "quantity".to_string(),
                message: "must be positive".to_string(),
                code: "invalid_value".to_string(),
            }],
        );
        assert_eq!(err.kind(), "ValidationError");

        let mapped = ErrorMappings::defaults().map(&err);
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert_eq!(mapped.code, "VALIDATION_ERROR");
    }
}
