//! Catalog errors

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown stock model: {0}")]
    UnknownModel(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Unknown option '{value}' for feature {feature}")]
    UnknownOption { feature: String, value: String },

    #[error("Unknown discount: {0}")]
    UnknownDiscount(String),
}

impl CatalogError {
    /// Order field the error refers to, if any
    pub fn field(&self) -> Option<String> {
        match self {
            Self::UnknownModel(_) => Some("model_id".to_string()),
            Self::UnknownFeature(id) | Self::UnknownOption { feature: id, .. } => {
                Some(format!("features.{id}"))
            }
            Self::UnknownDiscount(_) => Some("discount".to_string()),
            Self::Io(_) | Self::Parse(_) => None,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::Parse(_) => ErrorCode::CatalogLoadFailed,
            Self::UnknownModel(_) => ErrorCode::StockModelNotFound,
            Self::UnknownFeature(_) => ErrorCode::FeatureNotFound,
            Self::UnknownOption { .. } => ErrorCode::FeatureOptionNotFound,
            Self::UnknownDiscount(_) => ErrorCode::DiscountNotFound,
        }
    }
}

/// Unknown references on an order are a validation failure of that order
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err.field() {
            Some(field) => AppError::validation(err.to_string())
                .with_detail("field", field)
                .with_detail("reason", err.error_code().code()),
            None => AppError::with_message(err.error_code(), err.to_string()),
        }
    }
}
