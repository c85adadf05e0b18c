use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    constants::CONFIG_PATH_ENV,
    util::{parse_bool_var, parse_csv_var, parse_var, string_var},
};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub pagination: FilePaginationConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
    /// Human readable duration such as `"10h"` or `"1500ms"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilePaginationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub token_secret: Option<String>,
    pub token_ttl: Option<String>,
    pub password_pepper: Option<String>,
    pub default_page_limit: Option<usize>,
    pub max_page_limit: Option<usize>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_max_age: Option<String>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: string_var(CONFIG_PATH_ENV).map(PathBuf::from),
            server_host: string_var("ROSTER_SERVER_HOST"),
            server_port: parse_var("ROSTER_SERVER_PORT"),
            database_url: string_var("ROSTER_DATABASE_URL")
                .or_else(|| string_var("DATABASE_URL")),
            database_max_connections: parse_var(
                "ROSTER_DATABASE_MAX_CONNECTIONS",
            ),
            token_secret: string_var("ROSTER_TOKEN_SECRET"),
            token_ttl: string_var("ROSTER_TOKEN_TTL"),
            password_pepper: string_var("ROSTER_PASSWORD_PEPPER"),
            default_page_limit: parse_var("ROSTER_DEFAULT_PAGE_LIMIT"),
            max_page_limit: parse_var("ROSTER_MAX_PAGE_LIMIT"),
            cors_allowed_origins: parse_csv_var("ROSTER_CORS_ALLOWED_ORIGINS"),
            cors_allowed_methods: parse_csv_var("ROSTER_CORS_ALLOWED_METHODS"),
            cors_allowed_headers: parse_csv_var("ROSTER_CORS_ALLOWED_HEADERS"),
            cors_max_age: string_var("ROSTER_CORS_MAX_AGE"),
            dev_mode: parse_bool_var("ROSTER_DEV_MODE"),
        }
    }
}
