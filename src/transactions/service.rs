//! Transactions service: input validation in front of the repository

use uuid::Uuid;

use super::models::{NewTransaction, Transaction};
use super::repository::TransactionsRepository;
use crate::errors::{ApiError, FieldError};

/// Get transaction by ID; zero rows surfaces as `TransactionNotFound`.
pub async fn get_transaction_by_id(
    repo: &TransactionsRepository,
    id: Uuid,
) -> Result<Transaction, ApiError> {
    repo.get_by_id(id).await
}

/// List all transactions for a portfolio.
pub async fn list_transactions(
    repo: &TransactionsRepository,
    portfolio_id: Uuid,
) -> Result<Vec<Transaction>, ApiError> {
    repo.list_by_portfolio(portfolio_id).await
}

/// Validate and store a new transaction.
pub async fn create_transaction(
    repo: &TransactionsRepository,
    new: NewTransaction,
) -> Result<Transaction, ApiError> {
    validate_new_transaction(&new)?;
    repo.insert(&new).await
}

const TRANSACTION_TYPES: [&str; 4] = ["buy", "sell", "dividend", "fee"];

fn validate_new_transaction(new: &NewTransaction) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if new.symbol.trim().is_empty() {
        errors.push(field_error("symbol", "must not be empty", "invalid_value"));
    }
    if !TRANSACTION_TYPES.contains(&new.transaction_type.as_str()) {
        errors.push(field_error(
            "transaction_type",
            "must be one of: buy, sell, dividend, fee",
            "invalid_enum_value",
        ));
    }
    if new.quantity.is_sign_negative() || new.quantity.is_zero() {
        errors.push(field_error("quantity", "must be positive", "invalid_value"));
    }
    if new.price.is_sign_negative() {
        errors.push(field_error("price", "must not be negative", "invalid_value"));
    }
    if let Some(fee) = new.fee {
        if fee.is_sign_negative() {
            errors.push(field_error("fee", "must not be negative", "invalid_value"));
        }
    }
    if new.currency.len() != 3 || !new.currency.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push(field_error(
            "currency",
            "must be a 3-letter code",
            "invalid_format",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(
            format!("Validation failed: {} error(s)", errors.len()),
            errors,
        ))
    }
}

fn field_error(field: &str, message: &str, code: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
        code: code.to_string(),
    }
}
