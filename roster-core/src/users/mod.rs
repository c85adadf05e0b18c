//! User directory value types shared by the repository ports and the HTTP
//! layer.

use serde::{Deserialize, Serialize};

use crate::{auth::Principal, pagination::Keyed};

/// Conjunctive listing filter. String prefixes are expected lower-cased by
/// the caller and match case-insensitively against stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub username_prefix: Option<String>,
    pub email_prefix: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &UserSummary) -> bool {
        self.id.is_none_or(|id| user.id == id)
            && self.username_prefix.as_deref().is_none_or(|prefix| {
                user.username.to_lowercase().starts_with(prefix)
            })
            && self.email_prefix.as_deref().is_none_or(|prefix| {
                user.email.to_lowercase().starts_with(prefix)
            })
    }
}

/// Row shape of the user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub enabled: bool,
    pub is_admin: bool,
}

impl Keyed for UserSummary {
    fn key(&self) -> i64 {
        self.id
    }
}

/// Named catalog entry (role, module or submodule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// Full user record with resolved role, module and submodule names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub enabled: bool,
    pub is_admin: bool,
    pub roles: Vec<NamedRef>,
    pub modules: Vec<NamedRef>,
    pub submodules: Vec<NamedRef>,
}

/// Every role, module and submodule known to the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCatalog {
    pub roles: Vec<NamedRef>,
    pub modules: Vec<NamedRef>,
    pub submodules: Vec<NamedRef>,
}

/// Login material for one user. The hash never leaves the login flow.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub principal: Principal,
    pub password_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, username: &str, email: &str) -> UserSummary {
        UserSummary {
            id,
            username: username.into(),
            email: email.into(),
            enabled: true,
            is_admin: false,
        }
    }

    #[test]
    fn filters_are_conjunctive_prefixes() {
        let user = summary(4, "Alice", "alice@example.com");

        assert!(UserFilter::default().matches(&user));
        assert!(
            UserFilter {
                username_prefix: Some("al".into()),
                email_prefix: Some("alice@".into()),
                ..Default::default()
            }
            .matches(&user)
        );
        assert!(
            !UserFilter {
                id: Some(4),
                username_prefix: Some("bo".into()),
                ..Default::default()
            }
            .matches(&user)
        );
        assert!(
            !UserFilter {
                id: Some(5),
                ..Default::default()
            }
            .matches(&user)
        );
    }
}
