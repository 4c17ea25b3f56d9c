//! Account handlers

use axum::{
    Extension,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{
    AccountResponse, ApiJson, ApiResult, CreateAccountRequest, ErrorResponse, created, ok,
};
use crate::context::RequestContext;

/// Create account endpoint
///
/// POST /accounts
#[utoipa::path(
    post,
    path = "/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid input or malformed JSON", body = ErrorResponse),
        (status = 409, description = "Account already exists", body = ErrorResponse),
        (status = 500, description = "Datastore unavailable", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<CreateAccountRequest>,
) -> ApiResult<AccountResponse> {
    let account = state
        .ledger
        .create_account(&ctx, &req.account_id, &req.initial_balance)
        .await?;
    created(account.into())
}

/// Get account endpoint
///
/// GET /accounts/{account_id}
#[utoipa::path(
    get,
    path = "/accounts/{account_id}",
    params(
        ("account_id" = String, Path, description = "Account identifier")
    ),
    responses(
        (status = 200, description = "Current balance", body = AccountResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Datastore unavailable", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(account_id): Path<String>,
) -> ApiResult<AccountResponse> {
    let account = state.ledger.get_account(&ctx, &account_id).await?;
    ok(account.into())
}
