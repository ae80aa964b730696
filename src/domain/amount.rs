//! Amount type
//!
//! Domain primitive for transaction amounts. Validated on the write paths so a
//! stored transaction can never carry a zero, negative or oversized amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest single transaction amount accepted (one trillion)
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Maximum decimal places stored in `transactions.amount`
const MAX_SCALE: u32 = 2;

/// A validated transaction amount.
///
/// # Invariants
/// - Value is strictly positive
/// - At most 2 decimal places
/// - At most 1 000 000 000 000
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use seller_crm::domain::Amount;
///
/// let amount: Amount = "150.25".parse().unwrap();
/// assert_eq!(amount.value(), Decimal::new(15025, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Validate a raw decimal.
    ///
    /// Trailing zeros are normalized away before the scale check, so `10.500`
    /// is accepted as `10.5`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100));
        assert_eq!(amount.unwrap().value(), dec!(100));
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert!(matches!(Amount::new(Decimal::ZERO), Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert!(matches!(Amount::new(dec!(-5)), Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        assert!(matches!(Amount::new(dec!(0.125)), Err(AmountError::TooManyDecimals(3))));
    }

    #[test]
    fn test_amount_trailing_zeros_normalized() {
        let amount = Amount::new(dec!(10.500)).unwrap();
        assert_eq!(amount.value(), dec!(10.5));
    }

    #[test]
    fn test_amount_bounds() {
        assert!(Amount::new(dec!(1000000000000)).is_ok());
        assert!(matches!(Amount::new(dec!(1000000000001)), Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = " 123.45 ".parse().unwrap();
        assert_eq!(amount.value(), dec!(123.45));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_amount_display() {
        let amount = Amount::new(dec!(7)).unwrap();
        assert_eq!(amount.to_string(), "7.00");
    }
}
