//! Change history
//!
//! Every update or soft delete of a seller or transaction first copies the
//! current row into `sellers_history` / `transactions_history`. Writes run on
//! the caller's connection so the snapshot commits together with the change.

use std::net::IpAddr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::{OperationContext, PaymentType, Seller, Transaction};
use crate::store::{parse_payment_type, StoreError};

// =========================================================================
// ChangeType
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Updated,
    Deleted,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Updated => "UPDATED",
            ChangeType::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChangeType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPDATED" => Ok(ChangeType::Updated),
            "DELETED" => Ok(ChangeType::Deleted),
            other => Err(StoreError::CorruptRow {
                table: "history",
                reason: format!("unknown change_type '{other}'"),
            }),
        }
    }
}

// =========================================================================
// History entries
// =========================================================================

/// Snapshot of a seller taken before a change
#[derive(Debug, Clone, Serialize)]
pub struct SellerHistoryEntry {
    pub id: i64,
    pub seller_id: i64,
    pub seller_name: String,
    pub contact_info: String,
    pub registration_date: NaiveDateTime,
    pub is_active: bool,
    pub change_type: ChangeType,
    pub change_timestamp: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

/// Snapshot of a transaction taken before a change
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHistoryEntry {
    pub id: i64,
    pub transaction_id: i64,
    pub seller_id: i64,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub transaction_date: NaiveDateTime,
    pub is_active: bool,
    pub change_type: ChangeType,
    pub change_timestamp: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

#[derive(Debug, sqlx::FromRow)]
struct SellerHistoryRow {
    id: i64,
    seller_id: i64,
    seller_name: String,
    contact_info: String,
    registration_date: NaiveDateTime,
    is_active: bool,
    change_type: String,
    change_timestamp: NaiveDateTime,
    correlation_id: Option<Uuid>,
    client_ip: Option<String>,
}

impl TryFrom<SellerHistoryRow> for SellerHistoryEntry {
    type Error = StoreError;

    fn try_from(row: SellerHistoryRow) -> Result<Self, Self::Error> {
        Ok(SellerHistoryEntry {
            id: row.id,
            seller_id: row.seller_id,
            seller_name: row.seller_name,
            contact_info: row.contact_info,
            registration_date: row.registration_date,
            is_active: row.is_active,
            change_type: row.change_type.parse()?,
            change_timestamp: row.change_timestamp,
            correlation_id: row.correlation_id,
            client_ip: parse_client_ip(row.client_ip)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionHistoryRow {
    id: i64,
    transaction_id: i64,
    seller_id: i64,
    amount: Decimal,
    payment_type: String,
    transaction_date: NaiveDateTime,
    is_active: bool,
    change_type: String,
    change_timestamp: NaiveDateTime,
    correlation_id: Option<Uuid>,
    client_ip: Option<String>,
}

impl TryFrom<TransactionHistoryRow> for TransactionHistoryEntry {
    type Error = StoreError;

    fn try_from(row: TransactionHistoryRow) -> Result<Self, Self::Error> {
        Ok(TransactionHistoryEntry {
            id: row.id,
            transaction_id: row.transaction_id,
            seller_id: row.seller_id,
            amount: row.amount,
            payment_type: parse_payment_type(&row.payment_type)?,
            transaction_date: row.transaction_date,
            is_active: row.is_active,
            change_type: row.change_type.parse()?,
            change_timestamp: row.change_timestamp,
            correlation_id: row.correlation_id,
            client_ip: parse_client_ip(row.client_ip)?,
        })
    }
}

fn parse_client_ip(raw: Option<String>) -> Result<Option<IpAddr>, StoreError> {
    raw.map(|ip| {
        ip.parse().map_err(|_| StoreError::CorruptRow {
            table: "history",
            reason: format!("invalid client_ip '{ip}'"),
        })
    })
    .transpose()
}

// =========================================================================
// HistoryRecorder
// =========================================================================

/// Writes and reads change history
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    pool: PgPool,
}

impl HistoryRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record the pre-change state of `seller`.
    pub async fn record_seller(
        conn: &mut PgConnection,
        seller: &Seller,
        change_type: ChangeType,
        context: &OperationContext,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sellers_history (
                seller_id, seller_name, contact_info, registration_date, is_active,
                change_type, change_timestamp, correlation_id, api_key_fingerprint, client_ip
            )
            VALUES ($1, $2, $3, $4, $5, $6, LOCALTIMESTAMP, $7, $8, $9::inet)
            "#,
        )
        .bind(seller.id)
        .bind(&seller.seller_name)
        .bind(&seller.contact_info)
        .bind(seller.registration_date)
        .bind(seller.is_active)
        .bind(change_type.as_str())
        .bind(context.correlation_id)
        .bind(&context.api_key_fingerprint)
        .bind(context.client_ip.map(|ip| ip.to_string()))
        .execute(&mut *conn)
        .await?;

        tracing::debug!(seller_id = seller.id, change = %change_type, "Seller history recorded");
        Ok(())
    }

    /// Record the pre-change state of `transaction`.
    pub async fn record_transaction(
        conn: &mut PgConnection,
        transaction: &Transaction,
        change_type: ChangeType,
        context: &OperationContext,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions_history (
                transaction_id, seller_id, amount, payment_type, transaction_date, is_active,
                change_type, change_timestamp, correlation_id, api_key_fingerprint, client_ip
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, LOCALTIMESTAMP, $8, $9, $10::inet)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.seller_id)
        .bind(transaction.amount)
        .bind(transaction.payment_type.as_str())
        .bind(transaction.transaction_date)
        .bind(transaction.is_active)
        .bind(change_type.as_str())
        .bind(context.correlation_id)
        .bind(&context.api_key_fingerprint)
        .bind(context.client_ip.map(|ip| ip.to_string()))
        .execute(&mut *conn)
        .await?;

        tracing::debug!(
            transaction_id = transaction.id,
            change = %change_type,
            "Transaction history recorded"
        );
        Ok(())
    }

    /// History of one seller, oldest change first
    pub async fn seller_history(&self, seller_id: i64) -> Result<Vec<SellerHistoryEntry>, StoreError> {
        let rows: Vec<SellerHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, seller_id, seller_name, contact_info, registration_date, is_active,
                   change_type, change_timestamp, correlation_id, host(client_ip) AS client_ip
            FROM sellers_history
            WHERE seller_id = $1
            ORDER BY change_timestamp, id
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SellerHistoryEntry::try_from).collect()
    }

    /// History of one transaction, oldest change first
    pub async fn transaction_history(
        &self,
        transaction_id: i64,
    ) -> Result<Vec<TransactionHistoryEntry>, StoreError> {
        let rows: Vec<TransactionHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, transaction_id, seller_id, amount, payment_type, transaction_date, is_active,
                   change_type, change_timestamp, correlation_id, host(client_ip) AS client_ip
            FROM transactions_history
            WHERE transaction_id = $1
            ORDER BY change_timestamp, id
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionHistoryEntry::try_from).collect()
    }
}
