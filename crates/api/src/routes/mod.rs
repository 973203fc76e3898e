//! API routes

pub mod access;
pub mod calendar;
pub mod churches;
pub mod health;
pub mod plans;
pub mod saas;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::{require_auth, require_super_admin, PREFERRED_ROLE_HEADER},
    state::AppState,
};

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(PREFERRED_ROLE_HEADER),
        ])
}

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public API routes (no auth required) - under /api/v1
    let public_api_routes = Router::new()
        .route("/plans", get(plans::list_plans))
        .route("/plans/:plan_id/features", get(plans::plan_features))
        .route(
            "/plans/:plan_id/features/:feature",
            get(plans::feature_access),
        )
        .route("/calendar/holidays/:year", get(calendar::holidays));

    // SaaS console routes, allow-listed super admins only
    let saas_routes = Router::new()
        .route("/saas/overview", get(saas::overview))
        .route("/saas/churches", get(saas::list_churches))
        .route("/saas/churches/export", get(saas::export_churches))
        .route(
            "/saas/churches/:igreja_id/toggle-status",
            post(saas::toggle_church_status),
        )
        .route(
            "/saas/plans",
            get(saas::list_saas_plans).post(saas::create_saas_plan),
        )
        .route("/saas/plans/:plan_id", put(saas::update_saas_plan))
        .route("/saas/upgrades", get(saas::list_upgrades))
        .route(
            "/saas/upgrades/:request_id/approve",
            post(saas::approve_upgrade),
        )
        .route(
            "/saas/upgrades/:request_id/decline",
            post(saas::decline_upgrade),
        )
        .route(
            "/saas/subscriptions/pending",
            get(saas::list_pending_subscriptions),
        )
        .route(
            "/saas/subscriptions/:subscription_id/status",
            post(saas::set_subscription_status),
        )
        .route_layer(middleware::from_fn(require_super_admin));

    // Protected API routes (auth required) - under /api/v1
    let protected_api_routes = Router::new()
        .route("/session", get(access::get_session))
        .route("/session/switch-view", post(access::switch_view))
        .route("/navigation", get(access::get_navigation))
        .route("/team", get(access::get_team))
        .route("/access/evaluate", post(access::evaluate_route))
        .route("/churches", post(churches::create_church))
        .merge(saas_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api_v1_routes = Router::new()
        .merge(public_api_routes)
        .merge(protected_api_routes);

    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_v1_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
