//! Transaction Handler
//!
//! Recording, lookup, correction and soft delete of sales.

use sqlx::{PgConnection, PgPool};

use crate::domain::{DomainError, NewTransaction, OperationContext, Transaction, TransactionChanges};
use crate::error::AppError;
use crate::history::{ChangeType, HistoryRecorder};
use crate::store::TransactionRow;

use super::seller_handler::lock_active_seller;
use super::{CreateTransactionCommand, UpdateTransactionCommand};

fn into_transactions(rows: Vec<TransactionRow>) -> Result<Vec<Transaction>, AppError> {
    if rows.is_empty() {
        return Err(DomainError::NothingFound("transactions").into());
    }
    rows.into_iter()
        .map(|row| Transaction::try_from(row).map_err(AppError::from))
        .collect()
}

// =========================================================================
// TransactionHandler
// =========================================================================

#[derive(Debug, Clone)]
pub struct TransactionHandler {
    pool: PgPool,
}

impl TransactionHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a sale for an active seller, dated now
    pub async fn create(&self, command: CreateTransactionCommand) -> Result<Transaction, AppError> {
        let new = NewTransaction::new(command.seller_id, command.amount, &command.payment_type)?;

        let mut tx = self.pool.begin().await?;
        // Holds the seller row so a concurrent delete cannot strand the sale
        lock_active_seller(&mut *tx, new.seller_id).await?;

        let row: TransactionRow = sqlx::query_as(
            r#"
            INSERT INTO transactions (seller_id, amount, payment_type, transaction_date, is_active)
            VALUES ($1, $2, $3, LOCALTIMESTAMP, TRUE)
            RETURNING id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
            "#,
        )
        .bind(new.seller_id)
        .bind(new.amount.value())
        .bind(new.payment_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = row.id,
            seller_id = row.seller_id,
            amount = %row.amount,
            "Transaction created"
        );
        Ok(row.try_into()?)
    }

    /// Active transaction by id
    pub async fn get(&self, transaction_id: i64) -> Result<Transaction, AppError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
            FROM transactions
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_into()?),
            None => Err(DomainError::TransactionNotFound(transaction_id).into()),
        }
    }

    /// Active transactions of an active seller
    pub async fn list_for_seller(&self, seller_id: i64) -> Result<Vec<Transaction>, AppError> {
        let seller_active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM sellers WHERE id = $1")
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?;

        if seller_active != Some(true) {
            return Err(DomainError::SellerNotFound(seller_id).into());
        }

        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
            FROM transactions
            WHERE seller_id = $1 AND is_active = TRUE
            ORDER BY transaction_date, id
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        into_transactions(rows)
    }

    pub async fn list_active(&self) -> Result<Vec<Transaction>, AppError> {
        self.list(true).await
    }

    pub async fn list_all(&self) -> Result<Vec<Transaction>, AppError> {
        self.list(false).await
    }

    async fn list(&self, only_active: bool) -> Result<Vec<Transaction>, AppError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
            FROM transactions
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY transaction_date, id
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        into_transactions(rows)
    }

    /// Apply a partial correction, recording the previous state first
    pub async fn update(
        &self,
        transaction_id: i64,
        command: UpdateTransactionCommand,
        context: &OperationContext,
    ) -> Result<Transaction, AppError> {
        let changes = TransactionChanges::new(command.amount, command.payment_type.as_deref())?;

        let mut tx = self.pool.begin().await?;
        let current = lock_active_transaction(&mut *tx, transaction_id).await?;

        HistoryRecorder::record_transaction(&mut *tx, &current, ChangeType::Updated, context).await?;

        let row: TransactionRow = sqlx::query_as(
            r#"
            UPDATE transactions
            SET amount = COALESCE($2, amount),
                payment_type = COALESCE($3, payment_type),
                updated_at = LOCALTIMESTAMP
            WHERE id = $1
            RETURNING id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
            "#,
        )
        .bind(transaction_id)
        .bind(changes.amount.map(|a| a.value()))
        .bind(changes.payment_type.map(|p| p.as_str()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(transaction_id, correlation_id = ?context.correlation_id, "Transaction updated");
        Ok(row.try_into()?)
    }

    /// Soft delete one transaction
    pub async fn delete(&self, transaction_id: i64, context: &OperationContext) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_active_transaction(&mut *tx, transaction_id).await?;

        HistoryRecorder::record_transaction(&mut *tx, &current, ChangeType::Deleted, context).await?;

        sqlx::query("UPDATE transactions SET is_active = FALSE, updated_at = LOCALTIMESTAMP WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(transaction_id, correlation_id = ?context.correlation_id, "Transaction deleted");
        Ok(())
    }
}

async fn lock_active_transaction(
    conn: &mut PgConnection,
    transaction_id: i64,
) -> Result<Transaction, AppError> {
    let row: Option<TransactionRow> = sqlx::query_as(
        r#"
        SELECT id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
        FROM transactions
        WHERE id = $1 AND is_active = TRUE
        FOR UPDATE
        "#,
    )
    .bind(transaction_id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(row.try_into()?),
        None => Err(DomainError::TransactionNotFound(transaction_id).into()),
    }
}
