//! OpenAPI Documentation
//!
//! Generated OpenAPI 3.1 document for the ledger API, served as JSON at
//! `/api-docs/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::gateway::types::{
    AccountResponse, CreateAccountRequest, CreateTransferRequest, ErrorResponse, HealthResponse,
    TransferResponse,
};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Internal Transfers API",
        description = "Accounts with exact decimal balances and atomic transfers between them."
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::transfer::create_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            CreateAccountRequest,
            AccountResponse,
            CreateTransferRequest,
            TransferResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "System", description = "Health"),
        (name = "Accounts", description = "Create and read accounts"),
        (name = "Transfers", description = "Move funds between accounts"),
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
