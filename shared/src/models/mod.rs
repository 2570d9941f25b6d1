//! Data models
//!
//! Shared between floor-server and its clients (via API).
//! Money is `Decimal`; timestamps are Unix millis.

pub mod catalog;
pub mod department;
pub mod discount;
pub mod kickback;
pub mod order;
pub mod pricing;

// Re-exports
pub use catalog::*;
pub use department::*;
pub use discount::*;
pub use kickback::*;
pub use order::*;
pub use pricing::*;
