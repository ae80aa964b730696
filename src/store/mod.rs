//! Transaction store
//!
//! Read side consumed by the analytics engine. The engine only needs two
//! queries, so the seam is a small object-safe trait with a Postgres
//! implementation for the server and an in-memory one for tests and demos.

mod memory;
mod postgres;

pub use memory::InMemoryTransactionStore;
pub use postgres::PgTransactionStore;
pub(crate) use postgres::{parse_payment_type, SellerRow, TransactionRow};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::domain::{Seller, Transaction};

/// A transaction joined with a snapshot of its owning seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerTransaction {
    pub transaction: Transaction,
    pub seller: Seller,
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Transactions dated within the half-open `range`.
    ///
    /// With `active = true` only active transactions of active sellers are
    /// returned; with `active = false` every transaction of inactive sellers.
    async fn find_by_date_range_and_active_flag(
        &self,
        range: DateRange,
        active: bool,
    ) -> Result<Vec<SellerTransaction>, StoreError>;

    /// Every transaction of one seller, whatever the active flags.
    async fn find_all_for_seller(&self, seller_id: i64) -> Result<Vec<SellerTransaction>, StoreError>;
}

/// Whether a joined row passes the active-flag filter of
/// [`TransactionStore::find_by_date_range_and_active_flag`].
pub(crate) fn matches_active_flag(row: &SellerTransaction, active: bool) -> bool {
    if active {
        row.seller.is_active && row.transaction.is_active
    } else {
        !row.seller.is_active
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    #[error("Store lock poisoned")]
    Poisoned,
}
