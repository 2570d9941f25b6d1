//! Unified error codes for the floor system
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order and workflow errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is shipped or cancelled
    OrderTerminal = 4002,
    /// Transition not allowed from the current state
    InvalidTransition = 4003,
    /// Order id does not match the id format
    OrderIdInvalid = 4004,
    /// Order is not on the production floor
    OrderNotOnFloor = 4005,
    /// Kickback not found
    KickbackNotFound = 4101,
    /// Kickback target department not allowed
    KickbackTargetInvalid = 4102,
    /// Unknown department name
    DepartmentUnknown = 4201,

    // ==================== 6xxx: Catalog ====================
    /// Stock model not found
    StockModelNotFound = 6001,
    /// Feature not found
    FeatureNotFound = 6002,
    /// Feature option not found
    FeatureOptionNotFound = 6003,
    /// Discount not found
    DiscountNotFound = 6101,
    /// Catalog could not be loaded
    CatalogLoadFailed = 6201,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9005,

    // ==================== 94xx: Storage ====================
    StorageFull = 9401,
    StorageCorrupted = 9403,
    SystemBusy = 9404,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderTerminal => "Order is already shipped or cancelled",
            ErrorCode::InvalidTransition => "Transition not allowed in current state",
            ErrorCode::OrderIdInvalid => "Order id format is invalid",
            ErrorCode::OrderNotOnFloor => "Order is not in a production department",
            ErrorCode::KickbackNotFound => "Kickback not found",
            ErrorCode::KickbackTargetInvalid => "Kickback target department is not allowed",
            ErrorCode::DepartmentUnknown => "Unknown department",

            // Catalog
            ErrorCode::StockModelNotFound => "Stock model not found",
            ErrorCode::FeatureNotFound => "Feature not found",
            ErrorCode::FeatureOptionNotFound => "Feature option not found",
            ErrorCode::DiscountNotFound => "Discount not found",
            ErrorCode::CatalogLoadFailed => "Catalog could not be loaded",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",

            // Storage
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderTerminal),
            4003 => Ok(ErrorCode::InvalidTransition),
            4004 => Ok(ErrorCode::OrderIdInvalid),
            4005 => Ok(ErrorCode::OrderNotOnFloor),
            4101 => Ok(ErrorCode::KickbackNotFound),
            4102 => Ok(ErrorCode::KickbackTargetInvalid),
            4201 => Ok(ErrorCode::DepartmentUnknown),

            // Catalog
            6001 => Ok(ErrorCode::StockModelNotFound),
            6002 => Ok(ErrorCode::FeatureNotFound),
            6003 => Ok(ErrorCode::FeatureOptionNotFound),
            6101 => Ok(ErrorCode::DiscountNotFound),
            6201 => Ok(ErrorCode::CatalogLoadFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
