//! Shared types for the floor services
//!
//! Domain models (orders, departments, catalog, kickbacks), the unified
//! error system, and the order identifier allocator.

pub mod error;
pub mod models;
pub mod order_id;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
