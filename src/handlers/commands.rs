//! Command definitions
//!
//! Commands carry raw request input; handlers validate them against the
//! domain rules before touching the database.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =========================================================================
// Seller commands
// =========================================================================

/// Command to register a new seller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSellerCommand {
    pub seller_name: String,
    pub contact_info: String,
}

impl CreateSellerCommand {
    pub fn new(seller_name: impl Into<String>, contact_info: impl Into<String>) -> Self {
        Self {
            seller_name: seller_name.into(),
            contact_info: contact_info.into(),
        }
    }
}

/// Command to change a seller's name and/or contact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSellerCommand {
    pub seller_name: Option<String>,
    pub contact_info: Option<String>,
}

impl UpdateSellerCommand {
    pub fn with_seller_name(mut self, seller_name: impl Into<String>) -> Self {
        self.seller_name = Some(seller_name.into());
        self
    }

    pub fn with_contact_info(mut self, contact_info: impl Into<String>) -> Self {
        self.contact_info = Some(contact_info.into());
        self
    }
}

// =========================================================================
// Transaction commands
// =========================================================================

/// Command to record a sale for a seller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionCommand {
    pub seller_id: i64,
    pub amount: Decimal,
    pub payment_type: String,
}

impl CreateTransactionCommand {
    pub fn new(seller_id: i64, amount: Decimal, payment_type: impl Into<String>) -> Self {
        Self {
            seller_id,
            amount,
            payment_type: payment_type.into(),
        }
    }
}

/// Command to correct a transaction's amount and/or payment type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransactionCommand {
    pub amount: Option<Decimal>,
    pub payment_type: Option<String>,
}

impl UpdateTransactionCommand {
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_update_seller_builder() {
        let cmd = UpdateSellerCommand::default().with_contact_info("new@crm.dev");
        assert!(cmd.seller_name.is_none());
        assert_eq!(cmd.contact_info.as_deref(), Some("new@crm.dev"));
    }

    #[test]
    fn test_create_transaction_deserializes_string_amount() {
        let cmd: CreateTransactionCommand =
            serde_json::from_str(r#"{"seller_id": 3, "amount": "120.50", "payment_type": "card"}"#)
                .unwrap();
        assert_eq!(cmd.seller_id, 3);
        assert_eq!(cmd.amount, dec!(120.50));
        assert_eq!(cmd.payment_type, "card");
    }

    #[test]
    fn test_update_transaction_builder() {
        let cmd = UpdateTransactionCommand::default()
            .with_amount(dec!(10))
            .with_payment_type("CASH");
        assert_eq!(cmd.amount, Some(dec!(10)));
        assert_eq!(cmd.payment_type.as_deref(), Some("CASH"));
    }
}
