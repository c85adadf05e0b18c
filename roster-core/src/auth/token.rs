use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Claims carried by an access token.
///
/// `iat` and `exp` are encoded as epoch milliseconds so sub-second TTLs
/// survive the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(rename = "iat", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    SignatureMismatch,
    #[error("token has expired")]
    Expired,
}

/// Issues and decodes HS256 access tokens for a fixed secret and TTL.
///
/// Built once at startup and shared behind an `Arc`; nothing here mutates
/// after construction.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>, ttl: TimeDelta) -> Self {
        let secret = secret.as_ref();

        // Expiry is checked against the caller's clock, not jsonwebtoken's.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Sign `{sub, iat: now, exp: now + ttl}`. Identical inputs produce
    /// identical tokens.
    ///
    /// Signing errors are returned rather than panicking; HMAC keys accept
    /// any secret, so callers should treat an error as an internal fault.
    pub fn issue(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            subject: subject.to_owned(),
            issued_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Decode and verify a token. Structure is checked first, then the
    /// signature, then expiry against `now`.
    ///
    /// Once the header and claims segments parse, any failure is reported
    /// as [`TokenError::SignatureMismatch`], including a signature segment
    /// that is not valid base64url.
    pub fn decode(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut segments = token.splitn(3, '.');
        let (Some(header), Some(payload), Some(_)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header)?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::Malformed);
        }
        decode_segment::<Claims>(payload)?;

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::SignatureMismatch)?
            .claims;

        if now >= claims.expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn validate_for(
        &self,
        token: &str,
        expected_subject: &str,
        now: DateTime<Utc>,
    ) -> bool {
        self.decode(token, now)
            .map(|claims| claims.subject == expected_subject)
            .unwrap_or(false)
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
