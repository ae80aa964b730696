//! Command Handlers module
//!
//! Write and lookup paths for sellers and transactions. Every mutation of an
//! existing row records a history snapshot in the same database transaction.

mod commands;
mod seller_handler;
mod transaction_handler;

pub use commands::*;
pub use seller_handler::SellerHandler;
pub use transaction_handler::TransactionHandler;
