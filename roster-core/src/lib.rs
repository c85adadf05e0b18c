//! # Roster Core
//!
//! Core library for the Roster user directory: stateless bearer-token
//! authentication, request-scoped identity, keyset pagination and the user
//! directory persistence ports with their PostgreSQL and in-memory adapters.
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL adapter (SQLx) and embedded migrations
//!
//! ## Architecture
//!
//! - [`auth`]: token codec, authentication gate, request context, passwords
//! - [`pagination`]: keyset page assembly over a `fetch(limit + 1)` capability
//! - [`users`]: directory value types shared by ports and the HTTP layer
//! - [`database`]: repository ports and adapters

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
pub mod database;
pub mod pagination;
pub mod users;

#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use auth::{
    AuthCrypto, AuthCryptoError, AuthenticationGate, Claims, GateDecision,
    IdSet, IdentityError, IdentityLookup, InboundRequest, PasswordVerify,
    Principal, RequestContext, TokenCodec, TokenError,
};
pub use pagination::{
    Direction, KeysetPage, KeysetWindow, Keyed, PageRequest,
    PaginationRequestError, assemble_page, paginate,
};
