use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{matches_active_flag, SellerTransaction, StoreError, TransactionStore};
use crate::analytics::DateRange;
use crate::domain::{Seller, Transaction};

/// In-memory snapshot store.
///
/// Intended for tests/dev. Rows are returned ordered by transaction date,
/// then id, like the Postgres store.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    sellers: RwLock<HashMap<i64, Seller>>,
    transactions: RwLock<Vec<Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_seller(&self, seller: Seller) -> Result<(), StoreError> {
        let mut sellers = self.sellers.write().map_err(|_| StoreError::Poisoned)?;
        sellers.insert(seller.id, seller);
        Ok(())
    }

    /// Insert a transaction; its seller must already be present.
    pub fn insert_transaction(&self, transaction: Transaction) -> Result<(), StoreError> {
        let sellers = self.sellers.read().map_err(|_| StoreError::Poisoned)?;
        if !sellers.contains_key(&transaction.seller_id) {
            return Err(StoreError::CorruptRow {
                table: "transactions",
                reason: format!("unknown seller {}", transaction.seller_id),
            });
        }
        drop(sellers);

        let mut transactions = self.transactions.write().map_err(|_| StoreError::Poisoned)?;
        transactions.push(transaction);
        Ok(())
    }

    fn joined<F>(&self, keep: F) -> Result<Vec<SellerTransaction>, StoreError>
    where
        F: Fn(&SellerTransaction) -> bool,
    {
        let sellers = self.sellers.read().map_err(|_| StoreError::Poisoned)?;
        let transactions = self.transactions.read().map_err(|_| StoreError::Poisoned)?;

        let mut rows: Vec<SellerTransaction> = transactions
            .iter()
            .filter_map(|tx| {
                sellers.get(&tx.seller_id).map(|seller| SellerTransaction {
                    transaction: tx.clone(),
                    seller: seller.clone(),
                })
            })
            .filter(|row| keep(row))
            .collect();

        rows.sort_by_key(|row| (row.transaction.transaction_date, row.transaction.id));
        Ok(rows)
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn find_by_date_range_and_active_flag(
        &self,
        range: DateRange,
        active: bool,
    ) -> Result<Vec<SellerTransaction>, StoreError> {
        self.joined(|row| {
            range.contains(row.transaction.transaction_date) && matches_active_flag(row, active)
        })
    }

    async fn find_all_for_seller(&self, seller_id: i64) -> Result<Vec<SellerTransaction>, StoreError> {
        self.joined(|row| row.transaction.seller_id == seller_id)
    }
}
