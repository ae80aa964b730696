//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analytics::AnalyticsError;
use crate::domain::DomainError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    // Server errors (5xx)
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type Mapped = (StatusCode, &'static str, Option<String>);

fn map_domain(err: &DomainError) -> Mapped {
    match err {
        DomainError::InvalidAmount(msg) => (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone())),
        DomainError::InvalidPaymentType { allowed, .. } => {
            (StatusCode::BAD_REQUEST, "invalid_payment_type", Some(allowed.clone()))
        }
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone())),
        DomainError::EmptyUpdate => (StatusCode::BAD_REQUEST, "empty_update", None),
        DomainError::SellerNotFound(id) => (StatusCode::NOT_FOUND, "seller_not_found", Some(id.to_string())),
        DomainError::TransactionNotFound(id) => {
            (StatusCode::NOT_FOUND, "transaction_not_found", Some(id.to_string()))
        }
        DomainError::NothingFound(what) => (StatusCode::NOT_FOUND, "not_found", Some(what.to_string())),
        DomainError::SellerAlreadyExists(contact) => {
            (StatusCode::CONFLICT, "seller_already_exists", Some(contact.clone()))
        }
    }
}

fn map_store(err: &StoreError) -> Mapped {
    match err {
        StoreError::Database(e) => {
            tracing::error!("Database error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
        }
        StoreError::CorruptRow { .. } | StoreError::Poisoned => {
            tracing::error!("Store error: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
        }
    }
}

fn map_analytics(err: &AnalyticsError) -> Mapped {
    match err {
        AnalyticsError::InvalidPeriod { allowed, .. } => {
            (StatusCode::BAD_REQUEST, "invalid_period", Some(allowed.clone()))
        }
        AnalyticsError::InvalidDateOrder { .. } => (StatusCode::BAD_REQUEST, "invalid_date_order", None),
        AnalyticsError::DateOutOfRange(date) => {
            (StatusCode::BAD_REQUEST, "date_out_of_range", Some(date.to_string()))
        }
        AnalyticsError::NoSellersFound(_) => (StatusCode::NOT_FOUND, "no_sellers_found", None),
        AnalyticsError::NoTransactionsForSeller(id) => {
            (StatusCode::NOT_FOUND, "no_transactions_for_seller", Some(id.to_string()))
        }
        AnalyticsError::Store(store_err) => map_store(store_err),
    }
}

impl AppError {
    fn mapped(&self) -> Mapped {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone())),

            // 401 Unauthorized
            AppError::MissingApiKey => (StatusCode::UNAUTHORIZED, "missing_api_key", None),
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key", None),

            AppError::Domain(err) => map_domain(err),
            AppError::Analytics(err) => map_analytics(err),
            AppError::Store(err) => map_store(err),

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.mapped().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.mapped();

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
