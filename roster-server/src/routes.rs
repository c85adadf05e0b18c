use axum::{
    Router, middleware,
    routing::{get, post},
};
use roster_core::auth::LOGIN_PATH;
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{auth, health::health, users},
    infra::{app_state::AppState, cors::cors_layer},
    middleware::{authentication_gate, require_authenticated},
};

/// Build the full application router.
///
/// Every request passes the authentication gate; the user directory routes
/// additionally require an authenticated identity.
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/permissions", get(users::permissions))
        .route_layer(middleware::from_fn(require_authenticated));

    let public = Router::new()
        .route(LOGIN_PATH, post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/health", get(health));

    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_gate,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
