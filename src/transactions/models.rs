//! Transaction models mirroring the `transactions` table

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One financial transaction row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub date: NaiveDate,
    pub symbol: String,
    pub transaction_type: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: String,
    pub fee: Decimal,
    pub broker: String,
    pub created_at: Option<DateTime<Utc>>,
    pub source: String,
}

/// Creation payload; `id` and `created_at` are store-assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub portfolio_id: Uuid,
    pub date: NaiveDate,
    pub symbol: String,
    pub transaction_type: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub fee: Option<Decimal>,
    pub broker: String,
    #[serde(default)]
    pub source: Option<String>,
}
