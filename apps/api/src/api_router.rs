use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use ephemail_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let admin_routes = Router::new()
        .route(
            "/api/admin/cleanup-settings",
            get(handlers::cleanup::get_cleanup_settings_handler)
                .put(handlers::cleanup::save_cleanup_settings_handler),
        )
        .route(
            "/api/admin/cleanup",
            post(handlers::cleanup::manual_cleanup_handler),
        )
        .route(
            "/api/admin/cleanup/run",
            post(handlers::cleanup::run_cleanup_pass_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_admin_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
