//! Pricing API Handlers

use axum::{Json, extract::State};
use shared::models::{Catalog, PriceBreakdown};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::pricing::QuoteRequest;
use crate::utils::{ApiResponse, AppResult};

/// Price an order snapshot mid-edit; unknown ids price as zero
pub async fn quote(
    State(state): State<ServerState>,
    Json(req): Json<QuoteRequest>,
) -> AppResult<ApiResponse<PriceBreakdown>> {
    let breakdown = state.price_engine().quote(&req, now_millis());
    Ok(ApiResponse::success(breakdown))
}

/// Current catalog snapshot
pub async fn catalog(State(state): State<ServerState>) -> AppResult<ApiResponse<Catalog>> {
    Ok(ApiResponse::success(state.catalog.snapshot().catalog().clone()))
}

/// Re-read the catalog document; the previous catalog stays on failure
pub async fn reload_catalog(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<()>> {
    state.catalog.reload()?;
    Ok(ApiResponse::ok())
}
