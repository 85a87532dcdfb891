pub mod audit_log;
pub mod cron;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{auth, rate_limit},
    AppState,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let rate_limited = axum::middleware::from_fn_with_state(
        rate_limit::RateLimiter::new(state.config.public_rps),
        rate_limit::rps_middleware,
    );
    let admin_only = axum::middleware::from_fn_with_state(state.clone(), auth::require_admin);

    let base_routes = Router::new().route("/health", get(health::health));

    let audit_api = Router::new()
        .route(
            "/api/audit-logs",
            post(audit_log::create_audit_log)
                .route_layer(rate_limited.clone())
                .merge(get(audit_log::list_audit_logs).route_layer(admin_only)),
        )
        .route(
            "/api/client-errors",
            post(audit_log::report_client_error).route_layer(rate_limited),
        );

    let cron_api = Router::new().route(
        "/api/cron/cleanup-audit-logs",
        post(cron::cleanup_audit_logs),
    );

    base_routes
        .merge(audit_api)
        .merge(cron_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
