use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Create routes for the comments feature
///
/// Note: These routes accept anonymous callers; mount them behind the optional auth layer.
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/api/comments/{id}",
            get(handlers::get_comment)
                .put(handlers::replace_comment)
                .patch(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .with_state(service)
}
