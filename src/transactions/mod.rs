//! Transactions domain: models, repository, service, handlers

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{NewTransaction, Transaction};
pub use repository::TransactionsRepository;
