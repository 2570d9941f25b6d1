//! Department API Handlers

use axum::extract::{Path, State};
use shared::models::Department;

use crate::core::ServerState;
use crate::orders::QueueGroup;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Pipeline in order
pub async fn list() -> AppResult<ApiResponse<Vec<Department>>> {
    Ok(ApiResponse::success(Department::PIPELINE.to_vec()))
}

/// Orders in one department, grouped by model
pub async fn queue(
    State(state): State<ServerState>,
    Path(department): Path<String>,
) -> AppResult<ApiResponse<Vec<QueueGroup>>> {
    let department: Department = department.parse().map_err(|e: shared::models::UnknownDepartment| {
        AppError::with_message(ErrorCode::DepartmentUnknown, e.to_string())
            .with_detail("field", "department")
    })?;
    let groups = state.orders.department_queue(department)?;
    Ok(ApiResponse::success(groups))
}
