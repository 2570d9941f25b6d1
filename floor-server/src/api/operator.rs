//! Operator extractor
//!
//! Authentication lives outside this service. Callers name the person acting
//! in the `x-operator` header; the name only feeds the audit log.

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::core::ServerState;
use crate::utils::AppError;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};

pub const OPERATOR_HEADER: &str = "x-operator";

const ANONYMOUS: &str = "anonymous";

/// Operator named by the request
#[derive(Debug, Clone)]
pub struct Operator(pub String);

impl Operator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<ServerState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(OPERATOR_HEADER) else {
            return Ok(Operator(ANONYMOUS.to_string()));
        };
        let name = value
            .to_str()
            .map_err(|_| {
                AppError::validation("x-operator header is not valid text")
                    .with_detail("field", OPERATOR_HEADER)
            })?
            .trim();
        validate_required_text(name, OPERATOR_HEADER, MAX_SHORT_TEXT_LEN)?;
        Ok(Operator(name.to_string()))
    }
}
