//! Gateway request/response types
//!
//! ## Input Types
//! - [`CreateAccountRequest`], [`CreateTransferRequest`]: raw JSON bodies
//! - [`ApiJson`]: JSON extractor whose rejection is an [`ApiError`]
//!
//! ## Output Types
//! - [`AccountResponse`], [`TransferResponse`], [`HealthResponse`]
//! - [`ApiError`]: `{"code","msg"}` body with a status chosen by error kind

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::models::Account;
use crate::error::LedgerError;
use crate::transfer::types::TransferReceipt;

// ============================================================================
// Requests
// ============================================================================

/// Create account request
///
/// Missing fields deserialize as empty and are reported by validation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateAccountRequest {
    #[schema(example = "acc-1")]
    pub account_id: String,
    /// Decimal string, non-negative
    #[schema(example = "100.00")]
    pub initial_balance: String,
}

/// Transfer request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTransferRequest {
    #[schema(example = "acc-1")]
    pub source_account_id: String,
    #[schema(example = "acc-2")]
    pub destination_account_id: String,
    /// Decimal string, strictly positive
    #[schema(example = "40.50")]
    pub amount: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = "acc-1")]
    pub account_id: String,
    #[schema(example = "100")]
    pub balance: String,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            account_id: a.id.into_string(),
            balance: a.balance.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferResponse {
    /// ULID
    #[schema(example = "01J9Z3M8Q4X7V2N5K6R8T0W1YB")]
    pub transfer_id: String,
    pub source_account_id: String,
    pub destination_account_id: String,
    #[schema(example = "40.5")]
    pub amount: String,
    /// RFC 3339
    pub created_at: String,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(r: TransferReceipt) -> Self {
        Self {
            transfer_id: r.transfer_id.to_string(),
            source_account_id: r.source_account_id.into_string(),
            destination_account_id: r.destination_account_id.into_string(),
            amount: r.amount.to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "INSUFFICIENT_FUNDS")]
    pub code: String,
    #[schema(example = "insufficient funds in source account")]
    pub msg: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(code: &'static str, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, msg)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // opaque failures never leak datastore detail
        let msg = if status.is_server_error() {
            match &e {
                LedgerError::Timeout => "service busy, retry later".to_string(),
                _ => "internal error, retry later".to_string(),
            }
        } else {
            e.to_string()
        };
        Self::new(status, e.code(), msg)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::bad_request("INVALID_JSON", e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code.to_string(),
            msg: self.msg,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(data)))
}

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(data)))
}

// ============================================================================
// Extractor
// ============================================================================

/// `Json<T>` that rejects with [`ApiError`] (`400 INVALID_JSON`)
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}
