//! Last-mile converter from `Result` to HTTP responses
//!
//! Both services render through this module so every error response has the
//! literal shape `{"error": message, "code": code}` with a status from the
//! mapping table, and every success response is the bare resource JSON.
//!
//! The renderer performs no validation of its own; it only renders a result
//! already computed by the service and repository layers.

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::errors::{ApiError, ErrorMappings};

/// Stable client-facing error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Result renderer bound to a mapping table fixed at startup.
#[derive(Clone)]
pub struct Respond {
    mappings: Arc<ErrorMappings>,
}

impl Respond {
    pub fn new(mappings: ErrorMappings) -> Self {
        Self {
            mappings: Arc::new(mappings),
        }
    }

    /// Success -> 200 with the bare value; failure -> mapped error body.
    pub fn handle<T: Serialize>(&self, result: Result<T, ApiError>) -> Response {
        match result {
            Ok(value) => self.success(&value),
            Err(error) => self.error(&error),
        }
    }

    /// Like [`Respond::handle`], shaping the success value first.
    pub fn handle_with<T, U, F>(&self, result: Result<T, ApiError>, transform: F) -> Response
    where
        U: Serialize,
        F: FnOnce(T) -> U,
    {
        match result {
            Ok(value) => self.success(&transform(value)),
            Err(error) => self.error(&error),
        }
    }

    /// Creation endpoints: success -> 201 with the bare value.
    pub fn created<T: Serialize>(&self, result: Result<T, ApiError>) -> Response {
        match result {
            Ok(value) => (StatusCode::CREATED, Json(value)).into_response(),
            Err(error) => self.error(&error),
        }
    }

    /// 200 with the value as-is.
    pub fn success<T: Serialize>(&self, value: &T) -> Response {
        Json(value).into_response()
    }

    /// Render an error through the mapping table.
    pub fn error(&self, error: &ApiError) -> Response {
        let mapped = self.mappings.map(error);
        let body = ErrorBody {
            error: mapped.message,
            code: mapped.code,
        };
        (mapped.status, Json(body)).into_response()
    }
}
