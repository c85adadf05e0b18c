use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    context::RequestContext, lookup::IdentityLookup, token::TokenCodec,
};

/// Path that is always allowed through without resolving an identity.
pub const LOGIN_PATH: &str = "/api/auth/login";

const BEARER_PREFIX: &str = "Bearer ";

/// Transport-neutral view of the parts of a request the gate inspects.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub authorization: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// CORS preflight; answer with success and skip identity resolution.
    Preflight,
    /// Continue with the given identity, authenticated or not.
    Proceed(RequestContext),
}

/// Per-request filter resolving a bearer token into a [`RequestContext`].
///
/// Token failures never surface as errors: the request simply continues
/// unauthenticated and the authorization guard decides what that means.
#[derive(Debug)]
pub struct AuthenticationGate<L> {
    codec: Arc<TokenCodec>,
    lookup: L,
}

impl<L> AuthenticationGate<L>
where
    L: IdentityLookup,
{
    pub fn new(codec: Arc<TokenCodec>, lookup: L) -> Self {
        Self { codec, lookup }
    }

    pub async fn authenticate(
        &self,
        request: InboundRequest<'_>,
        existing: RequestContext,
    ) -> GateDecision {
        self.authenticate_at(request, existing, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        request: InboundRequest<'_>,
        existing: RequestContext,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if request.method == "OPTIONS" {
            return GateDecision::Preflight;
        }

        if request.path == LOGIN_PATH || existing.is_authenticated() {
            return GateDecision::Proceed(existing);
        }

        let Some(token) = request.authorization.and_then(extract_bearer_token)
        else {
            return GateDecision::Proceed(existing);
        };

        let claims = match self.codec.decode(token, now) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(
                    path = request.path,
                    reason = %err,
                    "bearer token rejected"
                );
                return GateDecision::Proceed(existing);
            }
        };

        let principal = match self.lookup.find_principal(&claims.subject).await
        {
            Ok(principal) => principal,
            Err(err) => {
                debug!(
                    subject = %claims.subject,
                    error = %err,
                    "token subject did not resolve to an identity"
                );
                return GateDecision::Proceed(existing);
            }
        };

        if !self.codec.validate_for(token, &principal.username, now) {
            debug!(subject = %claims.subject, "token subject mismatch");
            return GateDecision::Proceed(existing);
        }

        debug!(user_id = principal.id, "request authenticated");
        GateDecision::Proceed(RequestContext::authenticated(principal))
    }
}

pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        lookup::{IdentityError, MockIdentityLookup},
        principal::{IdSet, Principal},
    };
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            "gate-test-secret-with-plenty-of-bytes",
            TimeDelta::minutes(10),
        ))
    }

    fn alice() -> Principal {
        Principal {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            enabled: true,
            is_admin: false,
            roles: vec![1].into(),
            modules: IdSet::new(),
            submodules: IdSet::new(),
        }
    }

    fn get<'a>(authorization: Option<&'a str>) -> InboundRequest<'a> {
        InboundRequest {
            method: "GET",
            path: "/api/users",
            authorization,
        }
    }

    #[tokio::test]
    async fn valid_token_publishes_principal() {
        let codec = codec();
        let token = codec.issue("alice", t0()).unwrap();
        let header = format!("Bearer {token}");

        let mut lookup = MockIdentityLookup::new();
        lookup
            .expect_find_principal()
            .times(1)
            .returning(|username| {
                assert_eq!(username, "alice");
                Ok(alice())
            });

        let gate = AuthenticationGate::new(codec, lookup);
        let decision = gate
            .authenticate_at(
                get(Some(&header)),
                RequestContext::anonymous(),
                t0(),
            )
            .await;

        assert_eq!(
            decision,
            GateDecision::Proceed(RequestContext::authenticated(alice()))
        );
    }

    #[tokio::test]
    async fn preflight_short_circuits_without_lookup() {
        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().never();

        let gate = AuthenticationGate::new(codec(), lookup);
        let request = InboundRequest {
            method: "OPTIONS",
            path: "/api/users",
            authorization: Some("Bearer whatever"),
        };

        assert_eq!(
            gate.authenticate_at(request, RequestContext::anonymous(), t0())
                .await,
            GateDecision::Preflight
        );
    }

    #[tokio::test]
    async fn login_path_is_bypassed() {
        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().never();

        let gate = AuthenticationGate::new(codec(), lookup);
        let request = InboundRequest {
            method: "POST",
            path: LOGIN_PATH,
            authorization: Some("Bearer garbage"),
        };

        assert_eq!(
            gate.authenticate_at(request, RequestContext::anonymous(), t0())
                .await,
            GateDecision::Proceed(RequestContext::anonymous())
        );
    }

    #[tokio::test]
    async fn missing_or_foreign_scheme_is_anonymous() {
        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().never();
        let gate = AuthenticationGate::new(codec(), lookup);

        for header in [None, Some("Basic YWxpY2U6cHc="), Some("Bearer   ")] {
            assert_eq!(
                gate.authenticate_at(
                    get(header),
                    RequestContext::anonymous(),
                    t0()
                )
                .await,
                GateDecision::Proceed(RequestContext::anonymous())
            );
        }
    }

    #[tokio::test]
    async fn expired_token_is_anonymous_without_lookup() {
        let codec = codec();
        let token = codec.issue("alice", t0()).unwrap();
        let header = format!("Bearer {token}");

        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().never();

        let gate = AuthenticationGate::new(codec, lookup);
        let decision = gate
            .authenticate_at(
                get(Some(&header)),
                RequestContext::anonymous(),
                t0() + TimeDelta::hours(1),
            )
            .await;

        assert_eq!(
            decision,
            GateDecision::Proceed(RequestContext::anonymous())
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_anonymous() {
        let codec = codec();
        let token = codec.issue("ghost", t0()).unwrap();
        let header = format!("Bearer {token}");

        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().times(1).returning(|username| {
            Err(IdentityError::NotFound {
                username: username.to_string(),
            })
        });

        let gate = AuthenticationGate::new(codec, lookup);
        let decision = gate
            .authenticate_at(
                get(Some(&header)),
                RequestContext::anonymous(),
                t0(),
            )
            .await;

        assert_eq!(
            decision,
            GateDecision::Proceed(RequestContext::anonymous())
        );
    }

    #[tokio::test]
    async fn principal_with_other_username_is_rejected() {
        let codec = codec();
        let token = codec.issue("alice", t0()).unwrap();
        let header = format!("Bearer {token}");

        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().times(1).returning(|_| {
            Ok(Principal {
                username: "mallory".into(),
                ..alice()
            })
        });

        let gate = AuthenticationGate::new(codec, lookup);
        let decision = gate
            .authenticate_at(
                get(Some(&header)),
                RequestContext::anonymous(),
                t0(),
            )
            .await;

        assert_eq!(
            decision,
            GateDecision::Proceed(RequestContext::anonymous())
        );
    }

    #[tokio::test]
    async fn second_pass_with_published_identity_skips_decode_and_lookup() {
        let codec = codec();
        let token = codec.issue("alice", t0()).unwrap();
        let header = format!("Bearer {token}");

        // Any decode of this valid token would be followed by a lookup.
        let mut lookup = MockIdentityLookup::new();
        lookup.expect_find_principal().never();

        let gate = AuthenticationGate::new(codec, lookup);
        let existing = RequestContext::authenticated(Principal {
            id: 2,
            username: "bob".into(),
            ..alice()
        });

        let decision = gate
            .authenticate_at(get(Some(&header)), existing.clone(), t0())
            .await;

        assert_eq!(decision, GateDecision::Proceed(existing));
    }

    #[test]
    fn bearer_prefix_is_case_sensitive() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
