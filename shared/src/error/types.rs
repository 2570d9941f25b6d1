//! `AppError` and the JSON response envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned across the API boundary
///
/// `details` carries machine-readable context: the offending `field` for
/// validation failures, the `order_id` or `kickback_id` for lifecycle errors.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the stock message of `code`
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Numeric input outside its accepted range, tagged with the field
    pub fn out_of_range(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValueOutOfRange, msg).with_detail("field", field.into())
    }

    pub fn order_not_found(order_id: impl Into<String>) -> Self {
        let order_id = order_id.into();
        Self::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
            .with_detail("order_id", order_id)
    }

    pub fn kickback_not_found(kickback_id: i64) -> Self {
        Self::with_message(
            ErrorCode::KickbackNotFound,
            format!("Kickback {kickback_id} not found"),
        )
        .with_detail("kickback_id", kickback_id)
    }
}

/// Response envelope: `code` 0 with `data` on success, the error code with
/// `details` on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// HTTP status matching `code`; unknown codes map to 500
    fn status(&self) -> StatusCode {
        match self.code {
            None => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, |c| c.http_status()),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn ok() -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                details = ?self.details,
                "Request failed with a system error"
            );
        }
        (self.http_status(), axum::Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (self.status(), axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_lifecycle_errors_map_to_conflict() {
        for code in [
            ErrorCode::OrderTerminal,
            ErrorCode::InvalidTransition,
            ErrorCode::OrderNotOnFloor,
        ] {
            let response = AppError::new(code).into_response();
            assert_eq!(response.status(), StatusCode::CONFLICT, "{code:?}");
        }
    }

    #[test]
    fn test_input_errors_map_to_bad_request() {
        let err = AppError::out_of_range("misc_items[0].unit_price", "too large");
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        for code in [
            ErrorCode::OrderIdInvalid,
            ErrorCode::KickbackTargetInvalid,
            ErrorCode::DepartmentUnknown,
        ] {
            assert_eq!(AppError::new(code).http_status(), StatusCode::BAD_REQUEST, "{code:?}");
        }
    }

    #[test]
    fn test_missing_records_map_to_not_found() {
        let err = AppError::order_not_found("AG404");
        assert_eq!(err.message, "Order AG404 not found");
        assert_eq!(err.details.as_ref().unwrap()["order_id"], "AG404");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = AppError::kickback_not_found(42);
        assert_eq!(err.code, ErrorCode::KickbackNotFound);
        assert_eq!(err.details.as_ref().unwrap()["kickback_id"], 42);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_catalog_load_failure_is_server_error() {
        let response = AppError::new(ErrorCode::CatalogLoadFailed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_envelope_carries_field_detail() {
        let err = AppError::validation("customer_id must not be empty")
            .with_detail("field", "customer_id");
        let body = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();

        assert_eq!(body["code"], 2);
        assert_eq!(body["message"], "customer_id must not be empty");
        assert_eq!(body["details"]["field"], "customer_id");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_success_envelope() {
        let body = serde_json::to_value(ApiResponse::success(vec!["AG001"])).unwrap();
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"][0], "AG001");
        assert!(body.get("details").is_none());

        assert_eq!(ApiResponse::<()>::ok().into_response().status(), StatusCode::OK);
    }
}
