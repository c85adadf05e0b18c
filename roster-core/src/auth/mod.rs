//! Stateless bearer-token authentication.
//!
//! The [`AuthenticationGate`] turns an inbound `Authorization` header into a
//! [`RequestContext`] using a [`TokenCodec`] and an [`IdentityLookup`]. No
//! state survives the request.

pub mod context;
pub mod crypto;
pub mod gate;
pub mod lookup;
pub mod principal;
pub mod token;

pub use context::RequestContext;
pub use crypto::{AuthCrypto, AuthCryptoError, PasswordVerify};
pub use gate::{AuthenticationGate, GateDecision, InboundRequest, LOGIN_PATH};
pub use lookup::{IdentityError, IdentityLookup};
pub use principal::{IdSet, Principal};
pub use token::{Claims, TokenCodec, TokenError};
