//! Transaction records, payment types and write-path validation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Amount, DomainError};

/// How a transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    Cash,
    Card,
    Transfer,
}

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [PaymentType::Cash, PaymentType::Card, PaymentType::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "CASH",
            PaymentType::Card => "CARD",
            PaymentType::Transfer => "TRANSFER",
        }
    }

    fn allowed() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(PaymentType::as_str).collect();
        format!("[{}]", names.join(", "))
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| DomainError::InvalidPaymentType {
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }
}

/// A sale recorded against a seller, as stored in `transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub seller_id: i64,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub transaction_date: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

/// Validated fields for a new transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub seller_id: i64,
    pub amount: Amount,
    pub payment_type: PaymentType,
}

impl NewTransaction {
    pub fn new(seller_id: i64, amount: Decimal, payment_type: &str) -> Result<Self, DomainError> {
        Ok(Self {
            seller_id,
            amount: Amount::new(amount)?,
            payment_type: payment_type.parse()?,
        })
    }
}

/// Validated partial update of a transaction. At least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionChanges {
    pub amount: Option<Amount>,
    pub payment_type: Option<PaymentType>,
}

impl TransactionChanges {
    pub fn new(amount: Option<Decimal>, payment_type: Option<&str>) -> Result<Self, DomainError> {
        if amount.is_none() && payment_type.is_none() {
            return Err(DomainError::EmptyUpdate);
        }
        Ok(Self {
            amount: amount.map(Amount::new).transpose()?,
            payment_type: payment_type.map(str::parse::<PaymentType>).transpose()?,
        })
    }
}
