use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;

/// Failures of the analytics queries.
///
/// Every variant is raised where it is detected and returned unchanged; no
/// query ever yields a partial result.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid period '{period}'. Allowed periods: ({allowed})")]
    InvalidPeriod { period: String, allowed: String },

    #[error("Start date {start} must not be after end date {end}")]
    InvalidDateOrder { start: NaiveDate, end: NaiveDate },

    #[error("{0}")]
    NoSellersFound(String),

    #[error("Seller {0} has no transactions")]
    NoTransactionsForSeller(i64),

    #[error("Date {0} is outside the supported calendar range")]
    DateOutOfRange(NaiveDate),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnalyticsError {
    /// No transactions fell into the queried range.
    pub fn no_sellers_in_range() -> Self {
        Self::NoSellersFound("No sellers found".to_string())
    }

    /// Transactions exist, but no seller passed the filter.
    pub fn no_sellers_matched() -> Self {
        Self::NoSellersFound("No sellers matched the given parameters".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSellersFound(_) | Self::NoTransactionsForSeller(_))
    }
}
