use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::statuses::handlers;
use crate::features::statuses::services::StatusService;

/// Create routes for the statuses feature
pub fn routes(service: Arc<StatusService>) -> Router {
    Router::new()
        .route(
            "/api/status",
            get(handlers::list_statuses).post(handlers::create_status),
        )
        .route(
            "/api/status/{id}",
            get(handlers::get_status)
                .put(handlers::replace_status)
                .patch(handlers::update_status)
                .delete(handlers::delete_status),
        )
        .with_state(service)
}
