use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use roster_core::{GateDecision, InboundRequest, RequestContext};

use crate::infra::{app_state::AppState, errors::AppError};

/// Runs the authentication gate for every request and publishes the
/// resulting [`RequestContext`] into the request extensions.
///
/// Never rejects: an unusable token just leaves the request anonymous.
pub async fn authentication_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let inbound = InboundRequest {
        method: method.as_str(),
        path: &path,
        authorization: authorization.as_deref(),
    };

    match state.gate.authenticate(inbound, existing).await {
        GateDecision::Preflight => StatusCode::OK.into_response(),
        GateDecision::Proceed(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
    }
}

/// Authorization guard for protected routes.
pub async fn require_authenticated(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<RequestContext>()
        .is_some_and(RequestContext::is_authenticated);

    if !authenticated {
        return AppError::unauthorized("Authentication required")
            .into_response();
    }

    next.run(request).await
}
