//! Repository query wrappers
//!
//! Adapters from raw `sqlx` calls into the error taxonomy. Every store fault
//! becomes `ApiError::Database { operation, .. }` and is logged exactly once,
//! here, at the point of conversion.
//!
//! `fetch_by_id` additionally distinguishes "zero rows" from "store broken":
//! callers must be able to react differently (404 vs 500), so an empty result
//! is a typed `NotFound`, never a database fault. No retries happen here;
//! retry policy, if any, belongs to the caller.

use std::future::Future;

use crate::errors::ApiError;

/// Run a data-access future, wrapping any fault as a `DatabaseError`.
pub async fn execute_query<T, F>(operation: &str, query: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match query.await {
        Ok(value) => Ok(value),
        Err(fault) => {
            tracing::error!(operation, error = %fault, "database operation failed");
            Err(ApiError::database(operation, fault))
        }
    }
}

/// Run a lookup future; `None` maps to `{resource}NotFound`, faults to
/// `DatabaseError` with a `get{Resource}ById` operation name.
pub async fn fetch_by_id<T, F>(resource: &str, id: &str, query: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<Option<T>, sqlx::Error>>,
{
    match query.await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(ApiError::not_found(resource, id)),
        Err(fault) => {
            let operation = format!("get{}ById", resource);
            tracing::error!(operation, id, error = %fault, "database lookup failed");
            Err(ApiError::database(operation, fault))
        }
    }
}
