pub mod auth;

pub use auth::{authentication_gate, require_authenticated};
