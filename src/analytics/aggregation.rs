//! Per-seller totals: most productive sellers and sellers below a ceiling.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::AnalyticsError;
use crate::domain::Seller;
use crate::store::SellerTransaction;

/// A seller together with the sum of its transaction amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerTotal {
    pub seller: Seller,
    pub total: Decimal,
}

/// Sum amounts per seller id.
///
/// Groups keep the order in which each seller first appears in `transactions`,
/// so the output is deterministic for a given input order.
pub fn totals_by_seller(transactions: &[SellerTransaction]) -> Vec<SellerTotal> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut totals: Vec<SellerTotal> = Vec::new();

    for row in transactions {
        match index.get(&row.seller.id) {
            Some(&slot) => totals[slot].total += row.transaction.amount,
            None => {
                index.insert(row.seller.id, totals.len());
                totals.push(SellerTotal {
                    seller: row.seller.clone(),
                    total: row.transaction.amount,
                });
            }
        }
    }

    totals
}

/// Every seller whose total equals the maximum total. Ties are all reported.
pub fn most_productive(transactions: &[SellerTransaction]) -> Result<Vec<SellerTotal>, AnalyticsError> {
    let totals = totals_by_seller(transactions);

    let max = totals
        .iter()
        .map(|entry| entry.total)
        .max()
        .ok_or_else(AnalyticsError::no_sellers_in_range)?;

    Ok(totals.into_iter().filter(|entry| entry.total == max).collect())
}

/// Every seller whose total is strictly below `ceiling`.
pub fn below_threshold(
    transactions: &[SellerTransaction],
    ceiling: Decimal,
) -> Result<Vec<SellerTotal>, AnalyticsError> {
    if transactions.is_empty() {
        return Err(AnalyticsError::no_sellers_in_range());
    }

    let below: Vec<SellerTotal> = totals_by_seller(transactions)
        .into_iter()
        .filter(|entry| entry.total < ceiling)
        .collect();

    if below.is_empty() {
        return Err(AnalyticsError::no_sellers_matched());
    }

    Ok(below)
}
