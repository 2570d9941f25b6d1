//! Department API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/departments", get(handler::list))
        .route("/api/departments/{department}/queue", get(handler::queue))
}
