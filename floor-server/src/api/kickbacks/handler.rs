//! Kickback API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Kickback, KickbackStatusUpdate};

use crate::api::Operator;
use crate::core::ServerState;
use crate::orders::{DateRange, KickbackAnalytics, KickbackFilter};
use crate::utils::{ApiResponse, AppResult};

/// List kickbacks, optionally by order, status and originating department
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<KickbackFilter>,
) -> AppResult<ApiResponse<Vec<Kickback>>> {
    let kickbacks = state.orders.list_kickbacks(&filter)?;
    Ok(ApiResponse::success(kickbacks))
}

pub async fn update_status(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<i64>,
    Json(update): Json<KickbackStatusUpdate>,
) -> AppResult<ApiResponse<Kickback>> {
    let kickback = state
        .orders
        .update_kickback_status(id, &update, operator.as_str())?;
    Ok(ApiResponse::success(kickback))
}

/// Counts and resolution time, optionally within `start..=end` (Unix millis)
pub async fn analytics(
    State(state): State<ServerState>,
    Query(range): Query<DateRange>,
) -> AppResult<ApiResponse<KickbackAnalytics>> {
    let analytics = state.orders.kickback_analytics(range)?;
    Ok(ApiResponse::success(analytics))
}
