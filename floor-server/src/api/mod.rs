//! API routes
//!
//! - [`health`] - liveness
//! - [`orders`] - order drafts and lifecycle transitions
//! - [`pricing`] - price quotes
//! - [`departments`] - per-department queues
//! - [`kickbacks`] - kickback log and analytics

pub mod departments;
pub mod health;
pub mod kickbacks;
pub mod operator;
pub mod orders;
pub mod pricing;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppError, AppResult};
pub use operator::Operator;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(pricing::router())
        .merge(departments::router())
        .merge(kickbacks::router())
}

/// Build the fully configured application
///
/// Used by the HTTP server and by in-process `oneshot` calls.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
