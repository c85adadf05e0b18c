use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{
    auth::{IdSet, IdentityError, IdentityLookup, Principal},
    database::ports::users::{RepositoryError, UsersRepository},
    pagination::{Direction, KeysetWindow},
    users::{
        Credentials, NamedRef, PermissionCatalog, UserDetails, UserFilter,
        UserSummary,
    },
};

/// Read-only directory held in memory, keyed by id.
///
/// Built up front with the `with_*` methods and shared immutably afterwards.
/// Used for development without a database and by the HTTP tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsersRepository {
    users: BTreeMap<i64, Credentials>,
    roles: BTreeMap<i64, String>,
    modules: BTreeMap<i64, String>,
    submodules: BTreeMap<i64, String>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, id: i64, name: impl Into<String>) -> Self {
        self.roles.insert(id, name.into());
        self
    }

    pub fn with_module(mut self, id: i64, name: impl Into<String>) -> Self {
        self.modules.insert(id, name.into());
        self
    }

    pub fn with_submodule(mut self, id: i64, name: impl Into<String>) -> Self {
        self.submodules.insert(id, name.into());
        self
    }

    /// Add or replace the user with `credentials.principal.id`.
    pub fn with_user(mut self, credentials: Credentials) -> Self {
        self.users.insert(credentials.principal.id, credentials);
        self
    }

    /// Number of users in the directory.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    fn by_username(&self, username: &str) -> Option<&Credentials> {
        self.users
            .values()
            .find(|credentials| credentials.principal.username == username)
    }
}

fn summary(principal: &Principal) -> UserSummary {
    UserSummary {
        id: principal.id,
        username: principal.username.clone(),
        email: principal.email.clone(),
        enabled: principal.enabled,
        is_admin: principal.is_admin,
    }
}

/// Resolve ids against a catalog in ascending id order, skipping ids the
/// catalog does not know.
fn resolve(ids: &IdSet, catalog: &BTreeMap<i64, String>) -> Vec<NamedRef> {
    let mut refs: Vec<NamedRef> = ids
        .iter()
        .filter_map(|id| {
            catalog.get(&id).map(|name| NamedRef {
                id,
                name: name.clone(),
            })
        })
        .collect();
    refs.sort_by_key(|named| named.id);
    refs
}

fn listing(catalog: &BTreeMap<i64, String>) -> Vec<NamedRef> {
    catalog
        .iter()
        .map(|(id, name)| NamedRef {
            id: *id,
            name: name.clone(),
        })
        .collect()
}

#[async_trait]
impl IdentityLookup for InMemoryUsersRepository {
    async fn find_principal(
        &self,
        username: &str,
    ) -> Result<Principal, IdentityError> {
        self.by_username(username)
            .map(|credentials| credentials.principal.clone())
            .ok_or_else(|| IdentityError::NotFound {
                username: username.to_string(),
            })
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_user_details(
        &self,
        id: i64,
    ) -> Result<UserDetails, RepositoryError> {
        let principal = &self
            .users
            .get(&id)
            .ok_or(RepositoryError::UserNotFound(id))?
            .principal;

        Ok(UserDetails {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            enabled: principal.enabled,
            is_admin: principal.is_admin,
            roles: resolve(&principal.roles, &self.roles),
            modules: resolve(&principal.modules, &self.modules),
            submodules: resolve(&principal.submodules, &self.submodules),
        })
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<Credentials>, RepositoryError> {
        Ok(self.by_username(username).cloned())
    }

    async fn fetch_user_rows(
        &self,
        filter: &UserFilter,
        window: KeysetWindow,
    ) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = self
            .users
            .values()
            .map(|credentials| summary(&credentials.principal))
            .filter(|row| filter.matches(row));

        let rows: Vec<UserSummary> = match window.direction {
            Direction::Next => rows
                .filter(|row| window.last_id.is_none_or(|last| row.id > last))
                .take(window.fetch_limit)
                .collect(),
            Direction::Previous => rows
                .rev()
                .filter(|row| window.last_id.is_none_or(|last| row.id < last))
                .take(window.fetch_limit)
                .collect(),
        };

        Ok(rows)
    }

    async fn permission_catalog(
        &self,
    ) -> Result<PermissionCatalog, RepositoryError> {
        Ok(PermissionCatalog {
            roles: listing(&self.roles),
            modules: listing(&self.modules),
            submodules: listing(&self.submodules),
        })
    }
}
