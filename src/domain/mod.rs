//! Domain module
//!
//! Seller and transaction records plus the validation rules of their write paths.

pub mod amount;
pub mod context;
pub mod error;
pub mod seller;
pub mod transaction;

pub use amount::{Amount, AmountError};
pub use context::OperationContext;
pub use error::DomainError;
pub use seller::{NewSeller, Seller, SellerChanges};
pub use transaction::{NewTransaction, PaymentType, Transaction, TransactionChanges};
