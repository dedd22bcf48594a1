//! Main application configuration and router setup

use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use tessera_web::{identity_middleware, request_id_middleware};

use crate::{context::AppContext, handlers};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API path prefix
    pub api_prefix: String,
    /// Enable request ID tracking
    pub enable_request_id: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/v1".to_string(),
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

/// Create the complete REST API application
pub fn create_rest_app(context: AppContext, config: AppConfig) -> Router {
    let mut app = Router::new()
        // Health endpoint (no prefix)
        .route("/health", get(handlers::health_check))
        // API routes with prefix
        .nest(&config.api_prefix, create_api_router())
        .with_state(context)
        // Identity runs on every route; handlers reject missing claims
        .layer(from_fn(identity_middleware));

    if config.enable_request_id {
        app = app.layer(from_fn(request_id_middleware));
    }

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

/// Create unified API router
fn create_api_router() -> Router<AppContext> {
    Router::new()
        // Platform endpoints (god mode)
        .route(
            "/platform/tenants",
            get(handlers::list_tenants).post(handlers::create_tenant),
        )
        // Memberships
        .route(
            "/tenants/{tenant_id}/users",
            get(handlers::list_members).post(handlers::add_member),
        )
        // App enablement
        .route(
            "/tenants/{tenant_id}/apps/{app_id}",
            get(handlers::get_app)
                .post(handlers::post_app)
                .patch(handlers::patch_app)
                .delete(handlers::delete_app),
        )
        // Explicit per-member app grants
        .route(
            "/tenants/{tenant_id}/users/{user_id}/apps/{app_id}",
            post(handlers::grant_app).delete(handlers::revoke_app),
        )
        // Custom roles
        .route("/roles", get(handlers::list_roles).post(handlers::create_role))
        .route(
            "/roles/{role_id}",
            put(handlers::update_role).delete(handlers::delete_role),
        )
        // Entity schemas
        .route(
            "/entity/schema",
            get(handlers::list_schemas).post(handlers::create_schema),
        )
        .route("/entity/schema/{slug}", get(handlers::get_schema))
        // Entity records
        .route(
            "/entity/{slug}",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/entity/{slug}/{record_id}",
            get(handlers::get_record)
                .patch(handlers::update_record)
                .delete(handlers::delete_record),
        )
        // Template factory
        .route("/templates", get(handlers::list_templates))
        .route("/factory/instantiate", post(handlers::instantiate))
}
