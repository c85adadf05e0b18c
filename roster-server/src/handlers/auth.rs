use std::sync::Arc;

use axum::{
    Extension,
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use chrono::Utc;
use roster_core::{IdSet, Principal, RequestContext};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Projection of the current principal returned by `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub enabled: bool,
    pub is_admin: bool,
    pub roles: IdSet,
    pub modules: IdSet,
    pub submodules: IdSet,
}

impl From<&Principal> for CurrentUserResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            enabled: principal.enabled,
            is_admin: principal.is_admin,
            roles: principal.roles.clone(),
            modules: principal.modules.clone(),
            submodules: principal.submodules.clone(),
        }
    }
}

/// Exchange a username and password for a bearer token.
///
/// Unknown users, wrong passwords and disabled accounts all answer with the
/// same 401 body.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let Some(credentials) =
        state.users.find_credentials(&request.username).await?
    else {
        warn!(username = %request.username, "login rejected: unknown user");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    if !credentials.principal.enabled {
        warn!(username = %request.username, "login rejected: account disabled");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let passwords = Arc::clone(&state.passwords);
    let password = request.password;
    let password_hash = credentials.password_hash;
    let verified = tokio::task::spawn_blocking(move || {
        passwords.verify(&password, &password_hash)
    })
    .await
    .map_err(|err| {
        AppError::internal(format!("password check aborted: {err}"))
    })?;

    match verified {
        Ok(true) => {}
        Ok(false) => {
            warn!(username = %request.username, "login rejected: bad password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
        Err(err) => {
            error!(
                username = %request.username,
                error = %err,
                "stored password hash is unusable"
            );
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
    }

    let token = state
        .tokens
        .issue(&request.username, Utc::now())
        .map_err(|err| {
            error!(
                username = %request.username,
                error = %err,
                "token signing failed"
            );
            AppError::internal("Failed to issue token")
        })?;
    info!(username = %request.username, "login succeeded");

    Ok(Json(LoginResponse { token }))
}

/// Current principal, or 401 when the request is anonymous.
pub async fn me(
    Extension(context): Extension<RequestContext>,
) -> AppResult<Json<CurrentUserResponse>> {
    context
        .principal()
        .map(|principal| Json(CurrentUserResponse::from(principal)))
        .ok_or_else(|| AppError::unauthorized("Not authenticated"))
}
