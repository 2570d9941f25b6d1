//! Unified error handling
//!
//! Handlers return [`AppResult`](super::AppResult); the shared [`AppError`]
//! renders as an [`ApiResponse`] with the HTTP status of its [`ErrorCode`].
//!
//! ```ignore
//! Err(AppError::order_not_found(&id))
//!
//! Ok(ApiResponse::success(order))
//! ```

pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
