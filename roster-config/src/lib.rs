//! Configuration library for Roster.
//!
//! Values are layered from the process environment (optionally seeded from a
//! `.env` file), a TOML file and built-in defaults, in that order of
//! precedence. The composed [`Config`] is validated by guard rails before it
//! is handed to the server.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    PaginationConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
