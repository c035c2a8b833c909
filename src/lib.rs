//! finstack - Financial data demo stack
//!
//! Two HTTP services sharing one error taxonomy and one rendering path:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Client  │───▶│ Gateway  │───▶│ Core API │───▶│ Postgres │
//! │          │    │(auth+fwd)│    │ (axum)   │    │ (sqlx)   │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! # Modules
//!
//! - [`result_ext`] - Result collection combinators (sequence/partition)
//! - [`errors`] - Closed error taxonomy and the HTTP mapping table
//! - [`respond`] - Response rendering bound to a mapping table
//! - [`repository`] - Store-access wrappers (zero rows vs store fault)
//! - [`transactions`] - Transactions domain: models, repository, handlers
//! - [`api`] - Core API server
//! - [`gateway`] - Auth, header rewriting, default-deny proxy
//! - [`config`] - YAML configuration
//! - [`db`] - Postgres pool
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod repository;
pub mod respond;
pub mod result_ext;

pub mod api;
pub mod gateway;
pub mod transactions;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use errors::{ApiError, ErrorMapping, ErrorMappings};
pub use respond::Respond;
pub use result_ext::{Partitioned, partition, sequence};
