use axum::{
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::Json,
};
use roster_core::{
    Direction, KeysetPage, PageRequest,
    pagination::paginate,
    users::{PermissionCatalog, UserDetails, UserFilter, UserSummary},
};
use serde::Deserialize;

use crate::infra::{app_state::AppState, errors::AppResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub last_id: Option<i64>,
    pub limit: Option<i64>,
    pub direction: Option<String>,
}

impl ListUsersQuery {
    fn filter(&self) -> UserFilter {
        UserFilter {
            id: self.id,
            username_prefix: lowered(self.username.as_deref()),
            email_prefix: lowered(self.email.as_deref()),
        }
    }
}

fn lowered(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

/// `GET /api/users`: one keyset page of users, ascending by id.
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> AppResult<Json<KeysetPage<UserSummary>>> {
    let Query(query) = query?;

    let direction = match query.direction.as_deref() {
        Some(raw) => raw.parse::<Direction>()?,
        None => Direction::Next,
    };
    let pagination = state.config.pagination;
    let limit = query
        .limit
        .unwrap_or(i64::try_from(pagination.default_limit).unwrap_or(i64::MAX));

    let request = PageRequest::new(
        query.filter(),
        query.last_id,
        limit,
        direction,
        pagination.max_limit,
    )?;

    let page = paginate(&request, |window| {
        state.users.fetch_user_rows(&request.filter, window)
    })
    .await?;

    Ok(Json(page))
}

/// `GET /api/users/{id}`: full record with named roles and modules.
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<UserDetails>> {
    let Path(id) = id?;
    Ok(Json(state.users.find_user_details(id).await?))
}

/// `GET /api/permissions`: every role, module and submodule.
pub async fn permissions(
    State(state): State<AppState>,
) -> AppResult<Json<PermissionCatalog>> {
    Ok(Json(state.users.permission_catalog().await?))
}
