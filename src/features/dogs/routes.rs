use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::dogs::handlers;
use crate::features::dogs::services::DogReportService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Create routes for the dogs feature
///
/// Note: These routes accept anonymous callers; mount them behind the optional auth layer.
pub fn routes(service: Arc<DogReportService>) -> Router {
    Router::new()
        .route(
            "/api/dogs",
            get(handlers::list_dog_reports).post(handlers::create_dog_report),
        )
        .route(
            "/api/dogs/{id}",
            get(handlers::get_dog_report)
                .put(handlers::replace_dog_report)
                .patch(handlers::update_dog_report)
                .delete(handlers::delete_dog_report),
        )
        // Allow body size up to MAX_IMAGE_SIZE + buffer for multipart overhead
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024))
        .with_state(service)
}
