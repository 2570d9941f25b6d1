//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    Department, Kickback, KickbackCreate, KickbackPriority, Order, OrderDraft, OrderFilter,
    ScrapRequest,
};
use std::collections::BTreeMap;

use crate::api::Operator;
use crate::core::ServerState;
use crate::orders::{KickbackFilter, ProgressOutcome, ScrapOutcome};
use crate::utils::{ApiResponse, AppResult};

/// Preview of the next order id
#[derive(Debug, Serialize)]
pub struct NextIdResponse {
    pub order_id: String,
}

/// Batch progress payload
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub order_ids: Vec<String>,
    pub to_department: Department,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ProgressOutcome>,
}

/// Kickback result: the record plus the rerouted order
#[derive(Debug, Serialize)]
pub struct KickbackResponse {
    pub kickback: Kickback,
    pub order: Order,
}

/// Order kickbacks with their effective severity
#[derive(Debug, Serialize)]
pub struct OrderKickbacksResponse {
    pub severity: Option<KickbackPriority>,
    pub kickbacks: Vec<Kickback>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// List orders, optionally by status and department
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = state.orders.list_orders(&filter)?;
    Ok(ApiResponse::success(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.get_order(&id)?;
    Ok(ApiResponse::success(order))
}

/// Id the next new order would receive
pub async fn next_id(State(state): State<ServerState>) -> AppResult<ApiResponse<NextIdResponse>> {
    let order_id = state.orders.preview_next_order_id()?;
    Ok(ApiResponse::success(NextIdResponse { order_id }))
}

/// Create (no `order_id`) or update a draft
pub async fn save_draft(
    State(state): State<ServerState>,
    operator: Operator,
    Json(draft): Json<OrderDraft>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.save_draft(draft, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

pub async fn confirm(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.confirm(&id, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

pub async fn finalize(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.finalize(&id, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

pub async fn advance(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.advance(&id, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

pub async fn ship(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.ship(&id, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

/// Move a batch of orders; per-order failures do not fail the request
pub async fn progress(
    State(state): State<ServerState>,
    operator: Operator,
    Json(req): Json<ProgressRequest>,
) -> AppResult<ApiResponse<ProgressResponse>> {
    let results = state
        .orders
        .progress(&req.order_ids, req.to_department, operator.as_str());
    let succeeded = results.iter().filter(|r| r.success).count();
    Ok(ApiResponse::success(ProgressResponse {
        succeeded,
        failed: results.len() - succeeded,
        results,
    }))
}

pub async fn kickback(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<KickbackCreate>,
) -> AppResult<ApiResponse<KickbackResponse>> {
    let (kickback, order) = state.orders.kickback(&id, &req)?;
    Ok(ApiResponse::success(KickbackResponse { kickback, order }))
}

pub async fn kickbacks(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderKickbacksResponse>> {
    let severity = state.orders.severity(&id)?;
    let kickbacks = state.orders.list_kickbacks(&KickbackFilter {
        order_id: Some(id),
        ..Default::default()
    })?;
    Ok(ApiResponse::success(OrderKickbacksResponse {
        severity,
        kickbacks,
    }))
}

pub async fn cancel(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<ApiResponse<Order>> {
    let reason = body.and_then(|Json(req)| req.reason);
    let order = state.orders.cancel(&id, reason, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

pub async fn undo_cancel(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.undo_cancel(&id, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

/// Remove a draft that never reached the floor
pub async fn delete_draft(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.delete_draft(&id, operator.as_str())?;
    Ok(ApiResponse::success(order))
}

pub async fn scrap(
    State(state): State<ServerState>,
    operator: Operator,
    Path(id): Path<String>,
    Json(req): Json<ScrapRequest>,
) -> AppResult<ApiResponse<ScrapOutcome>> {
    let outcome = state.orders.scrap(&id, &req, operator.as_str())?;
    Ok(ApiResponse::success(outcome))
}

/// Live orders per production department
pub async fn pipeline_counts(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<BTreeMap<Department, usize>>> {
    let counts = state.orders.pipeline_counts()?;
    Ok(ApiResponse::success(counts))
}
