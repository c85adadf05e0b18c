//! # Roster Server
//!
//! HTTP surface of the Roster user directory: bearer-token login, the
//! authentication gate middleware, keyset-paginated user listing and the
//! permission catalog.

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
pub use routes::create_app;
