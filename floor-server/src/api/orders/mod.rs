//! Order API Module
//!
//! Drafts, lookups and lifecycle transitions. All mutations go through
//! [`OrdersManager`](crate::orders::OrdersManager).

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::save_draft))
        .route("/next-id", get(handler::next_id))
        .route("/pipeline-counts", get(handler::pipeline_counts))
        .route("/progress-department", post(handler::progress))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete_draft))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/finalize", post(handler::finalize))
        .route("/{id}/advance", post(handler::advance))
        .route("/{id}/ship", post(handler::ship))
        .route("/{id}/kickback", post(handler::kickback))
        .route("/{id}/kickbacks", get(handler::kickbacks))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/undo-cancel", post(handler::undo_cancel))
        .route("/{id}/scrap", post(handler::scrap))
}
