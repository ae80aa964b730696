//! Domain Error Types
//!
//! Validation and lookup failures of the seller/transaction write paths.
//! They are independent of the web and storage layers.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Amount is zero, negative, too precise or too large
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Payment type is empty or not one of the supported kinds
    #[error("Invalid payment type '{value}'. Allowed payment types: {allowed}")]
    InvalidPaymentType { value: String, allowed: String },

    /// A request field failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Update request carried no field to change
    #[error("Fields to update must not be empty")]
    EmptyUpdate,

    #[error("Seller with id {0} not found")]
    SellerNotFound(i64),

    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i64),

    /// Listing query returned nothing
    #[error("No {0} found")]
    NothingFound(&'static str),

    /// Contact info is already registered to another seller
    #[error("Seller with contact '{0}' already exists")]
    SellerAlreadyExists(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Check if this is a client error (caller's fault, never retryable)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidPaymentType { .. }
                | Self::Validation(_)
                | Self::EmptyUpdate
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SellerNotFound(_) | Self::TransactionNotFound(_) | Self::NothingFound(_)
        )
    }
}

impl From<super::AmountError> for DomainError {
    fn from(err: super::AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}
