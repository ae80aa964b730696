//! API Middleware
//!
//! API key authentication and request logging.

use std::net::IpAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

use super::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Hex characters of the key digest kept as the caller's fingerprint
const FINGERPRINT_LEN: usize = 12;

// =========================================================================
// ApiKeys
// =========================================================================

/// Accepted API keys, held as lowercase hex SHA-256 digests
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    digests: Arc<Vec<String>>,
}

impl ApiKeys {
    pub fn new(digests: Vec<String>) -> Self {
        Self {
            digests: Arc::new(digests),
        }
    }

    /// No keys configured: every request is let through
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.digests.is_empty()
    }

    /// Fingerprint of `raw_key` when it is one of the accepted keys
    pub fn verify(&self, raw_key: &str) -> Option<String> {
        let digest = sha256_hex(raw_key);
        self.digests
            .iter()
            .any(|accepted| *accepted == digest)
            .then(|| digest[..FINGERPRINT_LEN].to_string())
    }
}

/// Calculate SHA-256 hash and return as hex string
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

// =========================================================================
// API Key Authentication Middleware
// =========================================================================

fn correlation_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4)
}

fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse().ok())
}

/// Validate `X-API-Key` and attach an [`OperationContext`] to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let correlation_id = correlation_id(headers);
    let mut context = OperationContext::new().with_correlation_id(correlation_id);

    if let Some(ip) = client_ip(headers) {
        context = context.with_client_ip(ip);
    }

    if state.api_keys.is_enabled() {
        let api_key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::MissingApiKey)?;

        let fingerprint = state.api_keys.verify(api_key).ok_or_else(|| {
            tracing::warn!(%correlation_id, "Rejected request with unknown API key");
            AppError::InvalidApiKey
        })?;
        context = context.with_api_key_fingerprint(fingerprint);
    }

    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    Ok(response)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "x-api-key",
    "authorization",
    "cookie",
    "set-cookie",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());
    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    // Set by the auth middleware further in
    let correlation_id = response
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
