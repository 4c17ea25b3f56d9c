//! Transfer handler

use axum::{Extension, extract::State};

use super::super::state::AppState;
use super::super::types::{
    ApiJson, ApiResult, CreateTransferRequest, ErrorResponse, TransferResponse, created,
};
use crate::context::RequestContext;

/// Create transfer endpoint
///
/// POST /transactions
///
/// Atomic: either both balances change and the transfer is recorded, or
/// nothing changes.
#[utoipa::path(
    post,
    path = "/transactions",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer committed", body = TransferResponse),
        (status = 400, description = "Invalid input or insufficient funds", body = ErrorResponse),
        (status = 404, description = "Source or destination not found", body = ErrorResponse),
        (status = 422, description = "Destination balance would overflow", body = ErrorResponse),
        (status = 500, description = "Processing failed", body = ErrorResponse),
        (status = 503, description = "Timed out waiting for account locks", body = ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<CreateTransferRequest>,
) -> ApiResult<TransferResponse> {
    let receipt = state
        .ledger
        .transfer(
            &ctx,
            &req.source_account_id,
            &req.destination_account_id,
            &req.amount,
        )
        .await?;
    created(receipt.into())
}
