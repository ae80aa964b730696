//! Seller Handler
//!
//! Registration, lookup, update and soft delete of sellers.

use sqlx::{PgConnection, PgPool};

use crate::domain::{DomainError, NewSeller, OperationContext, Seller, SellerChanges, Transaction};
use crate::error::AppError;
use crate::history::{ChangeType, HistoryRecorder};
use crate::store::{SellerRow, TransactionRow};

use super::{CreateSellerCommand, UpdateSellerCommand};

const UNIQUE_VIOLATION: &str = "23505";

/// Map a unique-constraint failure on `contact_info` to a domain conflict
fn conflict_on_contact(err: sqlx::Error, contact_info: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            DomainError::SellerAlreadyExists(contact_info.to_string()).into()
        }
        _ => err.into(),
    }
}

// =========================================================================
// SellerHandler
// =========================================================================

#[derive(Debug, Clone)]
pub struct SellerHandler {
    pool: PgPool,
}

impl SellerHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new active seller
    pub async fn create(&self, command: CreateSellerCommand) -> Result<Seller, AppError> {
        let seller = NewSeller::new(&command.seller_name, &command.contact_info)?;

        let mut tx = self.pool.begin().await?;
        ensure_contact_free(&mut *tx, &seller.contact_info, None).await?;

        let row: SellerRow = sqlx::query_as(
            r#"
            INSERT INTO sellers (seller_name, contact_info, registration_date, is_active)
            VALUES ($1, $2, LOCALTIMESTAMP, TRUE)
            RETURNING id, seller_name, contact_info, registration_date, updated_at, is_active
            "#,
        )
        .bind(&seller.seller_name)
        .bind(&seller.contact_info)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_contact(e, &seller.contact_info))?;

        tx.commit().await?;

        tracing::info!(seller_id = row.id, "Seller created");
        Ok(row.into())
    }

    /// Active seller by id
    pub async fn get(&self, seller_id: i64) -> Result<Seller, AppError> {
        let row: Option<SellerRow> = sqlx::query_as(
            r#"
            SELECT id, seller_name, contact_info, registration_date, updated_at, is_active
            FROM sellers
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(seller_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Seller::from)
            .ok_or_else(|| DomainError::SellerNotFound(seller_id).into())
    }

    pub async fn list_active(&self) -> Result<Vec<Seller>, AppError> {
        self.list(true).await
    }

    /// Every seller, soft-deleted ones included
    pub async fn list_all(&self) -> Result<Vec<Seller>, AppError> {
        self.list(false).await
    }

    async fn list(&self, only_active: bool) -> Result<Vec<Seller>, AppError> {
        let rows: Vec<SellerRow> = sqlx::query_as(
            r#"
            SELECT id, seller_name, contact_info, registration_date, updated_at, is_active
            FROM sellers
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY id
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(DomainError::NothingFound("sellers").into());
        }
        Ok(rows.into_iter().map(Seller::from).collect())
    }

    /// Apply a partial update, recording the previous state first
    pub async fn update(
        &self,
        seller_id: i64,
        command: UpdateSellerCommand,
        context: &OperationContext,
    ) -> Result<Seller, AppError> {
        let changes = SellerChanges::new(command.seller_name.as_deref(), command.contact_info.as_deref())?;

        let mut tx = self.pool.begin().await?;
        let current = lock_active_seller(&mut *tx, seller_id).await?;

        if let Some(contact) = &changes.contact_info {
            ensure_contact_free(&mut *tx, contact, Some(seller_id)).await?;
        }

        HistoryRecorder::record_seller(&mut *tx, &current, ChangeType::Updated, context).await?;

        let row: SellerRow = sqlx::query_as(
            r#"
            UPDATE sellers
            SET seller_name = COALESCE($2, seller_name),
                contact_info = COALESCE($3, contact_info),
                updated_at = LOCALTIMESTAMP
            WHERE id = $1
            RETURNING id, seller_name, contact_info, registration_date, updated_at, is_active
            "#,
        )
        .bind(seller_id)
        .bind(&changes.seller_name)
        .bind(&changes.contact_info)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_contact(e, changes.contact_info.as_deref().unwrap_or_default()))?;

        tx.commit().await?;

        tracing::info!(seller_id, correlation_id = ?context.correlation_id, "Seller updated");
        Ok(row.into())
    }

    /// Soft delete the seller together with its active transactions
    pub async fn delete(&self, seller_id: i64, context: &OperationContext) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_active_seller(&mut *tx, seller_id).await?;

        HistoryRecorder::record_seller(&mut *tx, &current, ChangeType::Deleted, context).await?;

        let transactions: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, seller_id, amount, payment_type, transaction_date, updated_at, is_active
            FROM transactions
            WHERE seller_id = $1 AND is_active = TRUE
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(seller_id)
        .fetch_all(&mut *tx)
        .await?;

        for row in transactions {
            let transaction: Transaction = row.try_into()?;
            HistoryRecorder::record_transaction(&mut *tx, &transaction, ChangeType::Deleted, context).await?;
        }

        sqlx::query(
            r#"
            UPDATE transactions
            SET is_active = FALSE, updated_at = LOCALTIMESTAMP
            WHERE seller_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(seller_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE sellers SET is_active = FALSE, updated_at = LOCALTIMESTAMP WHERE id = $1")
            .bind(seller_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(seller_id, correlation_id = ?context.correlation_id, "Seller deleted");
        Ok(())
    }
}

/// Lock an active seller row for the rest of the transaction
pub(crate) async fn lock_active_seller(conn: &mut PgConnection, seller_id: i64) -> Result<Seller, AppError> {
    let row: Option<SellerRow> = sqlx::query_as(
        r#"
        SELECT id, seller_name, contact_info, registration_date, updated_at, is_active
        FROM sellers
        WHERE id = $1 AND is_active = TRUE
        FOR UPDATE
        "#,
    )
    .bind(seller_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(Seller::from)
        .ok_or_else(|| DomainError::SellerNotFound(seller_id).into())
}

async fn ensure_contact_free(
    conn: &mut PgConnection,
    contact_info: &str,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM sellers
            WHERE contact_info = $1 AND ($2::BIGINT IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(contact_info)
    .bind(except_id)
    .fetch_one(&mut *conn)
    .await?;

    if taken {
        return Err(DomainError::SellerAlreadyExists(contact_info.to_string()).into());
    }
    Ok(())
}
