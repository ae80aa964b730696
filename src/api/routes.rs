//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analytics::{BestPeriods, SellerTotal};
use crate::domain::{OperationContext, Seller, Transaction};
use crate::error::AppError;
use crate::handlers::{
    CreateSellerCommand, CreateTransactionCommand, SellerHandler, TransactionHandler,
    UpdateSellerCommand, UpdateTransactionCommand,
};
use crate::history::{HistoryRecorder, SellerHistoryEntry, TransactionHistoryEntry};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSellerRequest {
    pub seller_name: String,
    pub contact_info: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateSellerRequest {
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub seller_id: i64,
    pub amount: Decimal,
    pub payment_type: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

fn default_active() -> bool {
    true
}

/// `GET /analytics/most-productive`
#[derive(Debug, Deserialize)]
pub struct MostProductiveQuery {
    pub date: String,
    pub period: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// `GET /analytics/less-than`
#[derive(Debug, Deserialize)]
pub struct LessThanQuery {
    pub amount: String,
    pub start: String,
    pub end: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRequest(format!("{field} must be a YYYY-MM-DD date, got '{raw}'")))
}

fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::InvalidRequest(format!("amount must be a decimal number, got '{raw}'")))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Sellers
        .route("/sellers", get(list_sellers).post(create_seller))
        .route("/sellers/all", get(list_all_sellers))
        .route(
            "/sellers/:seller_id",
            get(get_seller).patch(update_seller).delete(delete_seller),
        )
        .route("/sellers/:seller_id/history", get(get_seller_history))
        // Transactions
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/all", get(list_all_transactions))
        .route("/transactions/seller/:seller_id", get(list_seller_transactions))
        .route(
            "/transactions/:transaction_id",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/:transaction_id/history", get(get_transaction_history))
        // Analytics
        .route("/analytics/most-productive", get(most_productive))
        .route("/analytics/less-than", get(less_than))
        .route("/analytics/best-periods/seller/:seller_id", get(best_periods))
}

// =========================================================================
// Sellers
// =========================================================================

async fn create_seller(
    State(state): State<AppState>,
    Json(request): Json<CreateSellerRequest>,
) -> Result<(StatusCode, Json<Seller>), AppError> {
    let command = CreateSellerCommand::new(request.seller_name, request.contact_info);
    let seller = SellerHandler::new(state.pool).create(command).await?;
    Ok((StatusCode::CREATED, Json(seller)))
}

async fn list_sellers(State(state): State<AppState>) -> Result<Json<Vec<Seller>>, AppError> {
    Ok(Json(SellerHandler::new(state.pool).list_active().await?))
}

async fn list_all_sellers(State(state): State<AppState>) -> Result<Json<Vec<Seller>>, AppError> {
    Ok(Json(SellerHandler::new(state.pool).list_all().await?))
}

async fn get_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<i64>,
) -> Result<Json<Seller>, AppError> {
    Ok(Json(SellerHandler::new(state.pool).get(seller_id).await?))
}

async fn update_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<i64>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<UpdateSellerRequest>,
) -> Result<Json<Seller>, AppError> {
    let command = UpdateSellerCommand {
        seller_name: request.seller_name,
        contact_info: request.contact_info,
    };
    let seller = SellerHandler::new(state.pool)
        .update(seller_id, command, &context)
        .await?;
    Ok(Json(seller))
}

/// Soft delete (seller and its transactions)
async fn delete_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<i64>,
    Extension(context): Extension<OperationContext>,
) -> Result<StatusCode, AppError> {
    SellerHandler::new(state.pool).delete(seller_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_seller_history(
    State(state): State<AppState>,
    Path(seller_id): Path<i64>,
) -> Result<Json<Vec<SellerHistoryEntry>>, AppError> {
    Ok(Json(HistoryRecorder::new(state.pool).seller_history(seller_id).await?))
}

// =========================================================================
// Transactions
// =========================================================================

async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let command = CreateTransactionCommand::new(request.seller_id, request.amount, request.payment_type);
    let transaction = TransactionHandler::new(state.pool).create(command).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn list_transactions(State(state): State<AppState>) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(TransactionHandler::new(state.pool).list_active().await?))
}

async fn list_all_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(TransactionHandler::new(state.pool).list_all().await?))
}

async fn list_seller_transactions(
    State(state): State<AppState>,
    Path(seller_id): Path<i64>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(TransactionHandler::new(state.pool).list_for_seller(seller_id).await?))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    Ok(Json(TransactionHandler::new(state.pool).get(transaction_id).await?))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    let command = UpdateTransactionCommand {
        amount: request.amount,
        payment_type: request.payment_type,
    };
    let transaction = TransactionHandler::new(state.pool)
        .update(transaction_id, command, &context)
        .await?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
    Extension(context): Extension<OperationContext>,
) -> Result<StatusCode, AppError> {
    TransactionHandler::new(state.pool)
        .delete(transaction_id, &context)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_transaction_history(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Vec<TransactionHistoryEntry>>, AppError> {
    Ok(Json(
        HistoryRecorder::new(state.pool)
            .transaction_history(transaction_id)
            .await?,
    ))
}

// =========================================================================
// Analytics
// =========================================================================

async fn most_productive(
    State(state): State<AppState>,
    Query(query): Query<MostProductiveQuery>,
) -> Result<Json<Vec<SellerTotal>>, AppError> {
    let date = parse_date("date", &query.date)?;
    let sellers = state
        .analytics
        .most_productive_sellers(date, &query.period, query.active)
        .await?;
    Ok(Json(sellers))
}

async fn less_than(
    State(state): State<AppState>,
    Query(query): Query<LessThanQuery>,
) -> Result<Json<Vec<SellerTotal>>, AppError> {
    let ceiling = parse_amount(&query.amount)?;
    let start = parse_date("start", &query.start)?;
    let end = parse_date("end", &query.end)?;
    let sellers = state
        .analytics
        .sellers_below_threshold(ceiling, start, end, query.active)
        .await?;
    Ok(Json(sellers))
}

async fn best_periods(
    State(state): State<AppState>,
    Path(seller_id): Path<i64>,
) -> Result<Json<BestPeriods>, AppError> {
    Ok(Json(state.analytics.best_periods_for_seller(seller_id).await?))
}
