use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::error;

use crate::{
    auth::{IdSet, IdentityError, IdentityLookup, Principal},
    database::ports::users::{RepositoryError, UsersRepository},
    pagination::{Direction, KeysetWindow},
    users::{
        Credentials, NamedRef, PermissionCatalog, UserDetails, UserFilter,
        UserSummary,
    },
};

const PRINCIPAL_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.enabled, u.is_admin, u.password_hash,
    COALESCE(
        (SELECT array_agg(role_id ORDER BY role_id)
         FROM user_roles WHERE user_id = u.id),
        '{}'
    ) AS roles,
    COALESCE(
        (SELECT array_agg(module_id ORDER BY module_id)
         FROM user_modules WHERE user_id = u.id),
        '{}'
    ) AS modules,
    COALESCE(
        (SELECT array_agg(submodule_id ORDER BY submodule_id)
         FROM user_submodules WHERE user_id = u.id),
        '{}'
    ) AS submodules
"#;

const FORWARD_ROWS: &str = r#"
    SELECT id, username, email, enabled, is_admin
    FROM users
    WHERE ($1::BIGINT IS NULL OR id > $1)
      AND ($2::BIGINT IS NULL OR id = $2)
      AND ($3::TEXT IS NULL OR lower(username) LIKE $3 ESCAPE '\')
      AND ($4::TEXT IS NULL OR lower(email) LIKE $4 ESCAPE '\')
    ORDER BY id ASC
    LIMIT $5
"#;

const BACKWARD_ROWS: &str = r#"
    SELECT id, username, email, enabled, is_admin
    FROM users
    WHERE ($1::BIGINT IS NULL OR id < $1)
      AND ($2::BIGINT IS NULL OR id = $2)
      AND ($3::TEXT IS NULL OR lower(username) LIKE $3 ESCAPE '\')
      AND ($4::TEXT IS NULL OR lower(email) LIKE $4 ESCAPE '\')
    ORDER BY id DESC
    LIMIT $5
"#;

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: i64,
    username: String,
    email: String,
    enabled: bool,
    is_admin: bool,
    password_hash: String,
    roles: Vec<i64>,
    modules: Vec<i64>,
    submodules: Vec<i64>,
}

impl PrincipalRow {
    fn into_credentials(self) -> Credentials {
        Credentials {
            principal: Principal {
                id: self.id,
                username: self.username,
                email: self.email,
                enabled: self.enabled,
                is_admin: self.is_admin,
                roles: IdSet::from(self.roles),
                modules: IdSet::from(self.modules),
                submodules: IdSet::from(self.submodules),
            },
            password_hash: self.password_hash,
        }
    }
}

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    pub async fn initialize_schema(&self) -> Result<(), RepositoryError> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            RepositoryError::Database(format!("Migration failed: {}", e))
        })
    }

    async fn principal_row(
        &self,
        username: &str,
    ) -> Result<Option<PrincipalRow>, RepositoryError> {
        let sql = format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM users u WHERE u.username = $1"
        );

        sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                error!(error = %e, "failed to load principal");
                RepositoryError::from(e)
            })
    }

    async fn named_refs(
        &self,
        sql: &str,
        user_id: i64,
    ) -> Result<Vec<NamedRef>, RepositoryError> {
        Ok(sqlx::query_as::<_, NamedRef>(sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await?)
    }

    async fn catalog(
        &self,
        sql: &str,
    ) -> Result<Vec<NamedRef>, RepositoryError> {
        Ok(sqlx::query_as::<_, NamedRef>(sql)
            .fetch_all(self.pool())
            .await?)
    }
}

#[async_trait]
impl IdentityLookup for PostgresUsersRepository {
    async fn find_principal(
        &self,
        username: &str,
    ) -> Result<Principal, IdentityError> {
        match self.principal_row(username).await? {
            Some(row) => Ok(row.into_credentials().principal),
            None => Err(IdentityError::NotFound {
                username: username.to_string(),
            }),
        }
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn find_user_details(
        &self,
        id: i64,
    ) -> Result<UserDetails, RepositoryError> {
        let user = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, email, enabled, is_admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = id, "failed to load user");
            RepositoryError::from(e)
        })?
        .ok_or(RepositoryError::UserNotFound(id))?;

        let roles = self
            .named_refs(
                r#"
                SELECT r.id, r.name
                FROM roles r
                INNER JOIN user_roles ur ON ur.role_id = r.id
                WHERE ur.user_id = $1
                ORDER BY r.id
                "#,
                id,
            )
            .await?;
        let modules = self
            .named_refs(
                r#"
                SELECT m.id, m.name
                FROM modules m
                INNER JOIN user_modules um ON um.module_id = m.id
                WHERE um.user_id = $1
                ORDER BY m.id
                "#,
                id,
            )
            .await?;
        let submodules = self
            .named_refs(
                r#"
                SELECT s.id, s.name
                FROM submodules s
                INNER JOIN user_submodules us ON us.submodule_id = s.id
                WHERE us.user_id = $1
                ORDER BY s.id
                "#,
                id,
            )
            .await?;

        Ok(UserDetails {
            id: user.id,
            username: user.username,
            email: user.email,
            enabled: user.enabled,
            is_admin: user.is_admin,
            roles,
            modules,
            submodules,
        })
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<Credentials>, RepositoryError> {
        Ok(self
            .principal_row(username)
            .await?
            .map(PrincipalRow::into_credentials))
    }

    async fn fetch_user_rows(
        &self,
        filter: &UserFilter,
        window: KeysetWindow,
    ) -> Result<Vec<UserSummary>, RepositoryError> {
        let sql = match window.direction {
            Direction::Next => FORWARD_ROWS,
            Direction::Previous => BACKWARD_ROWS,
        };
        let fetch_limit = i64::try_from(window.fetch_limit).unwrap_or(i64::MAX);

        sqlx::query_as::<_, UserSummary>(sql)
            .bind(window.last_id)
            .bind(filter.id)
            .bind(filter.username_prefix.as_deref().map(like_prefix))
            .bind(filter.email_prefix.as_deref().map(like_prefix))
            .bind(fetch_limit)
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    direction = %window.direction,
                    "failed to fetch user page"
                );
                RepositoryError::from(e)
            })
    }

    async fn permission_catalog(
        &self,
    ) -> Result<PermissionCatalog, RepositoryError> {
        Ok(PermissionCatalog {
            roles: self
                .catalog("SELECT id, name FROM roles ORDER BY id")
                .await?,
            modules: self
                .catalog("SELECT id, name FROM modules ORDER BY id")
                .await?,
            submodules: self
                .catalog("SELECT id, name FROM submodules ORDER BY id")
                .await?,
        })
    }
}

/// `LIKE` pattern matching values that start with `prefix` literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
