//! HTTP routing for the portal server.

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{AppState, proxy, routes};
use area_portal_session::facade::SESSION_API_PATH;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        // Session facade
        .route(
            SESSION_API_PATH,
            get(routes::session_status)
                .post(routes::persist_session)
                .delete(routes::clear_session),
        )
        // Auth Service proxies
        .route("/api/auth/login", post(proxy::login))
        .route("/api/auth/register", post(proxy::register))
        .route("/api/oauth/authorize", get(proxy::authorize))
        .route("/api/auth-providers", get(proxy::auth_providers))
        .route("/api/user-providers", get(proxy::user_providers))
        // Provider redirect
        .route("/auth/callback", get(routes::callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
