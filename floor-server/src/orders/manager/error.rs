use super::super::storage::StorageError;
use super::super::workflow::WorkflowError;
use crate::catalog::CatalogError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Kickback not found: {0}")]
    KickbackNotFound(i64),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Validation failed: {0}")]
    Validation(AppError),

    #[error("Order {0} can no longer be edited")]
    NotEditable(String),
}

/// Map a storage failure to an error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) | StorageError::DuplicateKickback(_) => {
            return ErrorCode::InternalError;
        }
        StorageError::OrderNotFound(_) => return ErrorCode::OrderNotFound,
        StorageError::KickbackNotFound(_) => return ErrorCode::KickbackNotFound,
        _ => {}
    }

    // redb errors carry no structured kind, match on the message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    ErrorCode::SystemBusy
}

impl ManagerError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ManagerError::Storage(e) => classify_storage_error(e),
            ManagerError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            ManagerError::KickbackNotFound(_) => ErrorCode::KickbackNotFound,
            ManagerError::Workflow(e) => match e {
                WorkflowError::Terminal { .. } => ErrorCode::OrderTerminal,
                WorkflowError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
                WorkflowError::NotOnFloor(_) => ErrorCode::OrderNotOnFloor,
                WorkflowError::KickbackTarget(_) => ErrorCode::KickbackTargetInvalid,
            },
            ManagerError::Catalog(e) => e.error_code(),
            ManagerError::Validation(e) => e.code,
            ManagerError::NotEditable(_) => ErrorCode::InvalidTransition,
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let code = err.error_code();
        match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                AppError::with_message(code, e.to_string())
            }
            ManagerError::OrderNotFound(id) => AppError::order_not_found(id),
            ManagerError::KickbackNotFound(id) => AppError::kickback_not_found(id),
            ManagerError::Workflow(e) => {
                let order_id = match &e {
                    WorkflowError::Terminal { order_id, .. }
                    | WorkflowError::InvalidTransition { order_id, .. }
                    | WorkflowError::NotOnFloor(order_id) => Some(order_id.clone()),
                    WorkflowError::KickbackTarget(_) => None,
                };
                let err = AppError::with_message(code, e.to_string());
                match order_id {
                    Some(id) => err.with_detail("order_id", id),
                    None => err.with_detail("field", "to_department"),
                }
            }
            ManagerError::Catalog(e) => e.into(),
            ManagerError::Validation(e) => e,
            ManagerError::NotEditable(id) => {
                AppError::with_message(code, format!("Order {id} can no longer be edited"))
                    .with_detail("order_id", id)
            }
        }
    }
}

impl From<AppError> for ManagerError {
    fn from(err: AppError) -> Self {
        ManagerError::Validation(err)
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
