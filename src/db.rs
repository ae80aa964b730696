//! Database module
//!
//! Connectivity and schema checks. The schema itself lives in `migrations/`.

use sqlx::PgPool;

/// Tables the server reads and writes
pub const REQUIRED_TABLES: [&str; 4] = [
    "sellers",
    "transactions",
    "sellers_history",
    "transactions_history",
];

/// Verify the database answers queries
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    tracing::info!(tables = ?REQUIRED_TABLES, "Database schema verified");
    Ok(true)
}
