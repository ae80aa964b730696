use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{SellerTransaction, StoreError, TransactionStore};
use crate::analytics::DateRange;
use crate::domain::{PaymentType, Seller, Transaction};

const JOINED_COLUMNS: &str = r#"
    t.id AS transaction_id,
    t.amount,
    t.payment_type,
    t.transaction_date,
    t.updated_at AS transaction_updated_at,
    t.is_active AS transaction_is_active,
    s.id AS seller_id,
    s.seller_name,
    s.contact_info,
    s.registration_date,
    s.updated_at AS seller_updated_at,
    s.is_active AS seller_is_active
"#;

/// Row shape of `sellers`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SellerRow {
    pub id: i64,
    pub seller_name: String,
    pub contact_info: String,
    pub registration_date: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

impl From<SellerRow> for Seller {
    fn from(row: SellerRow) -> Self {
        Seller {
            id: row.id,
            seller_name: row.seller_name,
            contact_info: row.contact_info,
            registration_date: row.registration_date,
            updated_at: row.updated_at,
            is_active: row.is_active,
        }
    }
}

/// Row shape of `transactions`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub id: i64,
    pub seller_id: i64,
    pub amount: Decimal,
    pub payment_type: String,
    pub transaction_date: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

pub(crate) fn parse_payment_type(raw: &str) -> Result<PaymentType, StoreError> {
    raw.parse().map_err(|_| StoreError::CorruptRow {
        table: "transactions",
        reason: format!("unknown payment_type '{raw}'"),
    })
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: row.id,
            seller_id: row.seller_id,
            amount: row.amount,
            payment_type: parse_payment_type(&row.payment_type)?,
            transaction_date: row.transaction_date,
            updated_at: row.updated_at,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    transaction_id: i64,
    amount: Decimal,
    payment_type: String,
    transaction_date: NaiveDateTime,
    transaction_updated_at: Option<NaiveDateTime>,
    transaction_is_active: bool,
    seller_id: i64,
    seller_name: String,
    contact_info: String,
    registration_date: NaiveDateTime,
    seller_updated_at: Option<NaiveDateTime>,
    seller_is_active: bool,
}

impl TryFrom<JoinedRow> for SellerTransaction {
    type Error = StoreError;

    fn try_from(row: JoinedRow) -> Result<Self, Self::Error> {
        Ok(SellerTransaction {
            transaction: Transaction {
                id: row.transaction_id,
                seller_id: row.seller_id,
                amount: row.amount,
                payment_type: parse_payment_type(&row.payment_type)?,
                transaction_date: row.transaction_date,
                updated_at: row.transaction_updated_at,
                is_active: row.transaction_is_active,
            },
            seller: Seller {
                id: row.seller_id,
                seller_name: row.seller_name,
                contact_info: row.contact_info,
                registration_date: row.registration_date,
                updated_at: row.seller_updated_at,
                is_active: row.seller_is_active,
            },
        })
    }
}

/// Postgres-backed transaction store.
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_joined(rows: Vec<JoinedRow>) -> Result<Vec<SellerTransaction>, StoreError> {
    rows.into_iter().map(SellerTransaction::try_from).collect()
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn find_by_date_range_and_active_flag(
        &self,
        range: DateRange,
        active: bool,
    ) -> Result<Vec<SellerTransaction>, StoreError> {
        let sql = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM transactions t
            JOIN sellers s ON s.id = t.seller_id
            WHERE t.transaction_date >= $1
              AND t.transaction_date < $2
              AND s.is_active = $3
              AND ($3 = false OR t.is_active = true)
            ORDER BY t.transaction_date, t.id
            "#
        );

        let rows: Vec<JoinedRow> = sqlx::query_as(&sql)
            .bind(range.start)
            .bind(range.end)
            .bind(active)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            start = %range.start,
            end = %range.end,
            active,
            rows = rows.len(),
            "Fetched transactions by date range"
        );

        into_joined(rows)
    }

    async fn find_all_for_seller(&self, seller_id: i64) -> Result<Vec<SellerTransaction>, StoreError> {
        let sql = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM transactions t
            JOIN sellers s ON s.id = t.seller_id
            WHERE t.seller_id = $1
            ORDER BY t.transaction_date, t.id
            "#
        );

        let rows: Vec<JoinedRow> = sqlx::query_as(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(seller_id, rows = rows.len(), "Fetched seller transactions");

        into_joined(rows)
    }
}
