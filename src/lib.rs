//! sellerCRM Library
//!
//! Re-exports modules for integration testing and external use.

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod history;
pub mod store;

mod error;

pub use analytics::{AnalyticsEngine, AnalyticsError};
pub use config::Config;
pub use domain::{Amount, AmountError, DomainError, OperationContext, PaymentType, Seller, Transaction};
pub use error::{AppError, AppResult};
pub use store::{InMemoryTransactionStore, PgTransactionStore, StoreError, TransactionStore};
