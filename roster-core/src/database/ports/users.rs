use async_trait::async_trait;
use thiserror::Error;

use crate::{
    auth::{IdentityError, IdentityLookup},
    pagination::KeysetWindow,
    users::{
        Credentials, PermissionCatalog, UserDetails, UserFilter, UserSummary,
    },
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error("database error: {0}")]
    Database(String),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

impl From<RepositoryError> for IdentityError {
    fn from(err: RepositoryError) -> Self {
        IdentityError::Unavailable(err.to_string())
    }
}

/// User directory persistence port.
///
/// Every adapter doubles as the [`IdentityLookup`] used by the
/// authentication gate.
#[async_trait]
pub trait UsersRepository: IdentityLookup {
    /// Full record for one user, `UserNotFound` when the id is unknown.
    async fn find_user_details(
        &self,
        id: i64,
    ) -> Result<UserDetails, RepositoryError>;

    /// Principal and password hash for a login attempt.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<Credentials>, RepositoryError>;

    /// Up to `window.fetch_limit` rows past `window.last_id`, ascending for
    /// NEXT and descending for PREVIOUS.
    async fn fetch_user_rows(
        &self,
        filter: &UserFilter,
        window: KeysetWindow,
    ) -> Result<Vec<UserSummary>, RepositoryError>;

    /// All roles, modules and submodules ordered by id.
    async fn permission_catalog(
        &self,
    ) -> Result<PermissionCatalog, RepositoryError>;
}
