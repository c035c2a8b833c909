//! HTTP handlers for the transactions endpoints
//!
//! Handlers parse and validate transport input, call the service layer, and
//! hand the resulting `Result` to the renderer. They never construct response
//! bodies themselves.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use uuid::Uuid;

use super::models::NewTransaction;
use super::service;
use crate::api::ApiState;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub portfolio_id: String,
}

/// GET /api/v1/transactions/{id}
pub async fn get_transaction(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_uuid(&id, "id", "Invalid transaction ID format") {
        Ok(id) => id,
        Err(error) => return state.respond.error(&error),
    };

    let result = service::get_transaction_by_id(&state.repo, id).await;
    state.respond.handle(result)
}

/// GET /api/v1/transactions?portfolio_id={uuid}
pub async fn list_transactions(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> Response {
    let portfolio_id = match parse_uuid(
        &params.portfolio_id,
        "portfolio_id",
        "Invalid portfolio ID format",
    ) {
        Ok(id) => id,
        Err(error) => return state.respond.error(&error),
    };

    let result = service::list_transactions(&state.repo, portfolio_id).await;
    state.respond.handle(result)
}

/// POST /api/v1/transactions
pub async fn create_transaction(
    State(state): State<ApiState>,
    Json(new): Json<NewTransaction>,
) -> Response {
    let result = service::create_transaction(&state.repo, new).await;
    state.respond.created(result)
}

fn parse_uuid(raw: &str, field: &str, message: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_input(message, Some(field)))
}
