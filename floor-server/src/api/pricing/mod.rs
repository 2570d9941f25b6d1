//! Pricing API Module
//!
//! Quotes are pure; nothing here writes to the order store.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/pricing/quote", post(handler::quote))
        .route("/api/catalog", get(handler::catalog))
        .route("/api/catalog/reload", post(handler::reload_catalog))
}
