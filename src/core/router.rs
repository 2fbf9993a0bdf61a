use std::sync::Arc;

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use sqlx::PgPool;

use crate::core::middleware;
use crate::features::auth::{routes as auth_routes, AuthService, TokenService};
use crate::features::comments::{routes as comments_routes, CommentService};
use crate::features::dogs::{routes as dogs_routes, DogReportService, GeocodingService};
use crate::features::statuses::{routes as statuses_routes, StatusService};
use crate::modules::storage::ObjectStorage;

/// Services behind the HTTP routes
#[derive(Clone)]
pub struct AppServices {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub dogs: Arc<DogReportService>,
    pub statuses: Arc<StatusService>,
    pub comments: Arc<CommentService>,
}

impl AppServices {
    pub fn new(
        pool: PgPool,
        tokens: Arc<TokenService>,
        storage: Arc<dyn ObjectStorage>,
        geocoder: Arc<GeocodingService>,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(pool.clone(), Arc::clone(&tokens))),
            dogs: Arc::new(DogReportService::new(pool.clone(), storage, geocoder)),
            statuses: Arc::new(StatusService::new(pool.clone())),
            comments: Arc::new(CommentService::new(pool)),
            tokens,
        }
    }
}

// Simple health check endpoint (no auth required)
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All API routes with their auth layers.
///
/// Swagger and the HTTP-wide layers (CORS, tracing, request ids) are added by the caller.
pub fn api_routes(services: &AppServices) -> Router {
    // Protected routes (require a valid access token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .route_layer(from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::auth_middleware,
        ));

    // Record routes (anonymous callers allowed, tokens resolved when present)
    let record_routes = Router::new()
        .merge(dogs_routes::routes(Arc::clone(&services.dogs)))
        .merge(statuses_routes::routes(Arc::clone(&services.statuses)))
        .merge(comments_routes::routes(Arc::clone(&services.comments)))
        .route_layer(from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::optional_auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&services.auth)))
        .route("/health", get(health_check));

    Router::new()
        .merge(protected_routes)
        .merge(record_routes)
        .merge(public_routes)
}
