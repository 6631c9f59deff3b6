//! Supabase clients: GoTrue auth and PostgREST profiles.
//!
//! Direct HTTP via reqwest; no SDK. The persisted session format follows
//! GoTrue's token response so a stored session round-trips unchanged.
//!
//! Modules:
//! - auth: GoTrue password sign-in, sign-up, user fetch, refresh, logout
//! - profiles: PostgREST `profiles` table (fetch + plan updates)
//! - token_store: persisted session at ~/.studypal/session.json

pub mod auth;
pub mod profiles;
pub mod token_store;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;
use crate::types::Identity;

/// Consider a session expired this many seconds before its real expiry, so
/// a token never dies mid-request.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("No stored session")]
    SessionMissing,
    #[error("Session refresh failed: {0}")]
    RefreshFailed(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AuthApiError> for ProviderError {
    fn from(err: AuthApiError) -> Self {
        ProviderError::new(err.to_string())
    }
}

/// GoTrue user object (the subset this app reads).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl AuthUser {
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            email: self.email,
            metadata: self.user_metadata,
        }
    }
}

/// Session payload persisted by the token store.
///
/// Field names follow GoTrue's token response; `accessToken` is accepted on
/// read for sessions migrated from the JS client's storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds. GoTrue sometimes omits this; see [`session_expires_at`].
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Whether `session`'s access token is expired (with the safety margin).
/// A session whose expiry cannot be determined counts as expired, which
/// simply routes it through a refresh.
pub fn is_session_expired(session: &AuthSession) -> bool {
    match session_expires_at(session) {
        Some(expires_at) => chrono::Utc::now().timestamp() + EXPIRY_MARGIN_SECS >= expires_at,
        None => true,
    }
}

/// Expiry as unix seconds: the explicit `expires_at` field when present,
/// otherwise the `exp` claim decoded from the access token itself.
fn session_expires_at(session: &AuthSession) -> Option<i64> {
    session
        .expires_at
        .or_else(|| jwt_exp(&session.access_token))
}

/// Decode the `exp` claim from a JWT payload without verifying the
/// signature. Expiry is a local scheduling hint; verification is GoTrue's
/// job when the token is presented.
fn jwt_exp(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<i64>, token: &str) -> AuthSession {
        AuthSession {
            access_token: token.to_string(),
            refresh_token: Some("refresh".into()),
            expires_at,
            user: None,
        }
    }

    fn jwt_with_exp(exp: i64) -> String {
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(serde_json::json!({ "exp": exp }).to_string());
        format!("header.{}.signature", payload)
    }

    #[test]
    fn test_session_roundtrip_with_access_token_alias() {
        let json = r#"{
            "accessToken": "jwt-token",
            "refresh_token": "r1",
            "expires_at": 1900000000,
            "user": {"id": "u1", "email": "a@x.com", "user_metadata": {"first_name": "Ada"}}
        }"#;
        let parsed: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "jwt-token");
        let user = parsed.user.unwrap();
        assert_eq!(user.id, "u1");
        let identity = user.into_identity();
        assert_eq!(identity.metadata_str(&["first_name"]), Some("Ada"));
    }

    #[test]
    fn test_future_expiry_not_expired() {
        let future = chrono::Utc::now().timestamp() + 3600;
        assert!(!is_session_expired(&session(Some(future), "t")));
    }

    #[test]
    fn test_within_margin_counts_as_expired() {
        let soon = chrono::Utc::now().timestamp() + 30;
        assert!(is_session_expired(&session(Some(soon), "t")));
    }

    #[test]
    fn test_past_expiry_expired() {
        let past = chrono::Utc::now().timestamp() - 10;
        assert!(is_session_expired(&session(Some(past), "t")));
    }

    #[test]
    fn test_missing_expires_at_falls_back_to_jwt_exp() {
        let future = chrono::Utc::now().timestamp() + 3600;
        assert!(!is_session_expired(&session(None, &jwt_with_exp(future))));

        let past = chrono::Utc::now().timestamp() - 3600;
        assert!(is_session_expired(&session(None, &jwt_with_exp(past))));
    }

    #[test]
    fn test_undecodable_token_counts_as_expired() {
        assert!(is_session_expired(&session(None, "not-a-jwt")));
    }
}
