use axum::http::{HeaderValue, Method, header::HeaderName};
use thiserror::Error;

use crate::{
    constants::MIN_SECRET_LENGTH,
    models::{AuthConfig, Config, CorsConfig, PaginationConfig},
};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("token TTL must be greater than zero")]
    ZeroTokenTtl,
    #[error("invalid pagination configuration: {reason}")]
    InvalidPagination { reason: String },
    #[error("no database URL configured and ROSTER_DEV_MODE is false")]
    MissingDatabase,
    #[error(
        "CORS wildcard origins are not allowed when ROSTER_DEV_MODE is false"
    )]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    enforce_secrets(&config.auth, config.dev_mode, &mut warnings)?;

    if config.auth.token_ttl.is_zero() {
        return Err(ConfigGuardRailError::ZeroTokenTtl);
    }

    validate_pagination(&config.pagination)?;

    if config.database.url.is_none() {
        if !config.dev_mode {
            return Err(ConfigGuardRailError::MissingDatabase);
        }
        warnings.push_with_hint(
            "No database URL configured; serving the in-memory user directory",
            "Set ROSTER_DATABASE_URL to use PostgreSQL",
        );
    }

    if !config.dev_mode && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard);
    }

    validate_cors(&config.cors)?;

    Ok(warnings)
}

fn enforce_secrets(
    auth: &AuthConfig,
    dev_mode: bool,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    let checks = [
        (
            "ROSTER_TOKEN_SECRET",
            auth.token_secret.as_str(),
            auth.is_default_token_secret(),
        ),
        (
            "ROSTER_PASSWORD_PEPPER",
            auth.password_pepper.as_str(),
            auth.is_default_pepper(),
        ),
    ];

    for (field, value, is_default) in checks {
        if value.is_empty() {
            return Err(ConfigGuardRailError::WeakSecret {
                field,
                reason: "must not be empty".into(),
            });
        }

        let reason = if is_default {
            Some("uses the default placeholder value".to_string())
        } else if value.len() < MIN_SECRET_LENGTH {
            Some(format!("must be at least {MIN_SECRET_LENGTH} characters"))
        } else {
            None
        };

        if let Some(reason) = reason {
            if !dev_mode {
                return Err(ConfigGuardRailError::WeakSecret { field, reason });
            }
            warnings.push_with_hint(
                format!("{field} {reason}"),
                "Acceptable for local development only; \
                 set a random value of 32+ characters",
            );
        }
    }

    Ok(())
}

fn validate_pagination(
    pagination: &PaginationConfig,
) -> Result<(), ConfigGuardRailError> {
    if pagination.default_limit == 0 || pagination.max_limit == 0 {
        return Err(ConfigGuardRailError::InvalidPagination {
            reason: "page limits must be at least 1".into(),
        });
    }

    if pagination.default_limit > pagination.max_limit {
        return Err(ConfigGuardRailError::InvalidPagination {
            reason: format!(
                "default limit {} exceeds max limit {}",
                pagination.default_limit, pagination.max_limit
            ),
        });
    }

    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in cors.allowed_origins.iter().filter(|o| o.trim() != "*") {
        HeaderValue::from_str(origin).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid origin `{}` in ROSTER_CORS_ALLOWED_ORIGINS",
                    origin
                ),
            }
        })?;
    }

    if cors.allowed_methods.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason: "ROSTER_CORS_ALLOWED_METHODS must include \
                     at least one HTTP method"
                .into(),
        });
    }

    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid HTTP method `{}` in ROSTER_CORS_ALLOWED_METHODS",
                    method
                ),
            }
        })?;
    }

    for header in cors.allowed_headers.iter().filter(|h| h.trim() != "*") {
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid header name `{}` in ROSTER_CORS_ALLOWED_HEADERS",
                    header
                ),
            }
        })?;
    }

    Ok(())
}
