//! Signed session cookies.
//!
//! There is no server-side session store: the cookie itself is an HS256 JWT
//! carrying the username and how it was authenticated. Tampering fails the
//! signature check and reads as "not logged in".

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use vac_model::AuthSource;

pub const SESSION_COOKIE: &str = "vac_session";

const SESSION_TTL_SECS: i64 = 12 * 60 * 60;

/// The logged-in identity as read from a valid session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub source: AuthSource,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    src: String,
    iat: i64,
    exp: i64,
}

/// Signing/verification keys derived from the configured secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint a session token for a freshly authenticated user.
    pub fn issue(
        &self,
        username: &str,
        source: AuthSource,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: username.to_string(),
            src: source.as_str().to_string(),
            iat: now,
            exp: now + SESSION_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Validate a token. Any failure (bad signature, expiry, unknown auth
    /// source) reads as anonymous.
    pub fn verify(&self, token: &str) -> Option<Session> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;
        let source = data.claims.src.parse().ok()?;
        Some(Session {
            username: data.claims.sub,
            source,
        })
    }

    /// Session from the request cookies, if any.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = cookie_value(headers, SESSION_COOKIE)?;
        self.verify(&token)
    }
}

/// Extractor for the logged-in user, `None` when anonymous or the cookie
/// does not verify.
pub struct CurrentUser(pub Option<Session>);

impl FromRequestParts<crate::state::AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::state::AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(state.keys.session_from_headers(&parts.headers)))
    }
}

/// Pull one cookie out of the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(name) {
                return parts.next().map(str::to_string);
            }
        }
    }
    None
}

/// `Set-Cookie` value that installs a session token.
pub fn set_session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
    )
}

/// `Set-Cookie` value that drops the session.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn issue_then_verify_roundtrip() {
        let keys = SessionKeys::new("test-secret");
        let token = keys.issue("alice", AuthSource::Internal).unwrap();
        let session = keys.verify(&token).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.source, AuthSource::Internal);
    }

    #[test]
    fn other_secret_rejects_the_token() {
        let keys = SessionKeys::new("secret-a");
        let token = keys.issue("alice", AuthSource::Sso).unwrap();
        assert!(SessionKeys::new("secret-b").verify(&token).is_none());
    }

    #[test]
    fn tampered_token_rejected() {
        let keys = SessionKeys::new("test-secret");
        let mut token = keys.issue("alice", AuthSource::Pam).unwrap();
        token.push('x');
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; vac_session=tok-123; other=1"),
        );
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("tok-123")
        );
        assert!(cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn session_from_headers_uses_the_cookie() {
        let keys = SessionKeys::new("test-secret");
        let token = keys.issue("bob", AuthSource::Internal).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).unwrap(),
        );
        let session = keys.session_from_headers(&headers).unwrap();
        assert_eq!(session.username, "bob");
    }
}
