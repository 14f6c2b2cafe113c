//! # courtside_api
//!
//! HTTP API library for Courtside.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{codes, content, health};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `courtside_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    courtside_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (anonymous callers resolve to preview or denied)
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/courses/{course_slug}/packages",
            get(content::list_packages_handler),
        )
        .route("/api/content/{course_slug}", get(content::get_content_handler))
        .route("/api/codes/redeem", post(codes::redeem_handler));

    // Administrator routes
    let admin = Router::new()
        .route("/api/admin/codes", post(codes::generate_codes_handler))
        .route(
            "/api/admin/courses/{course_id}/codes",
            get(codes::list_course_codes_handler),
        )
        .layer(axum::middleware::from_fn(
            middleware::identity::require_admin,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::identity::resolve_identity,
        ))
        .layer(cors)
        .with_state(state)
}
