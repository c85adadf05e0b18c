use std::time::Duration;

/// Placeholder signing secret for local development. Rejected outside
/// dev mode.
pub const DEFAULT_TOKEN_SECRET: &str = "roster-dev-token-secret-change-me";

/// Placeholder password pepper for local development. Rejected outside
/// dev mode.
pub const DEFAULT_PASSWORD_PEPPER: &str =
    "roster-dev-password-pepper-change-me";

pub const MIN_SECRET_LENGTH: usize = 32;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(10 * 60 * 60);

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const DEFAULT_MAX_PAGE_LIMIT: usize = 500;

pub const DEFAULT_CORS_MAX_AGE: Duration = Duration::from_secs(3600);

pub const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG";
