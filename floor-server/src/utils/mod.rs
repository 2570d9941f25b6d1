//! Utilities - error types, logging and input validation
//!
//! - [`AppError`] - application error (from shared::error)
//! - [`ApiResponse`] - API response envelope (from shared::error)

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
pub use result::AppResult;
