use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::principal::Principal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity not found: {username}")]
    NotFound { username: String },
    #[error("identity lookup unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a token subject into the principal it names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn find_principal(
        &self,
        username: &str,
    ) -> Result<Principal, IdentityError>;
}

#[async_trait]
impl<T> IdentityLookup for Arc<T>
where
    T: IdentityLookup + ?Sized,
{
    async fn find_principal(
        &self,
        username: &str,
    ) -> Result<Principal, IdentityError> {
        (**self).find_principal(username).await
    }
}
