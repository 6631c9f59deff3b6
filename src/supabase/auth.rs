//! GoTrue auth client.
//!
//! Implements [`AuthProvider`] for the session core and exposes the
//! credential operations (sign-in, sign-up) the login screens call
//! directly. Stored sessions are refreshed lazily; concurrent refreshes are
//! serialized through one tokio Mutex so only a single request hits the
//! token endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{is_session_expired, token_store, AuthApiError, AuthSession, AuthUser};
use crate::config::SupabaseConfig;
use crate::providers::{AuthProvider, ProviderError};
use crate::types::Identity;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Serializes concurrent token refreshes.
static TOKEN_REFRESH_MUTEX: std::sync::OnceLock<Mutex<()>> = std::sync::OnceLock::new();

fn refresh_mutex() -> &'static Mutex<()> {
    TOKEN_REFRESH_MUTEX.get_or_init(|| Mutex::new(()))
}

pub struct SupabaseAuthClient {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseAuthClient {
    pub fn new(config: SupabaseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        SupabaseAuthClient { client, config }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Password grant. On success the session is persisted and the signed-in
    /// identity returned.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthApiError> {
        let resp = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body));
        }

        let session: AuthSession = resp.json().await?;
        token_store::save_session(&session)?;
        match session.user {
            Some(user) => Ok(user.into_identity()),
            None => self.fetch_user(&session.access_token).await,
        }
    }

    /// Create an account. `metadata` lands in the identity's metadata bag
    /// (name fields from the sign-up form). When the project requires email
    /// confirmation GoTrue returns a bare user with no session; the caller
    /// still gets the identity, and sign-in happens after confirmation.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Identity, AuthApiError> {
        let resp = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body));
        }

        let body: serde_json::Value = resp.json().await?;
        let (session, user) = parse_signup_body(body)?;
        if let Some(session) = session {
            token_store::save_session(&session)?;
        }
        Ok(user.into_identity())
    }

    /// The signed-in identity, or None when no usable session exists.
    ///
    /// Refreshes an expired stored session first, then asks GoTrue for the
    /// authoritative user object (metadata may have changed out of band).
    /// A revoked token clears local storage and reads as signed out.
    pub async fn current_identity(&self) -> Result<Option<Identity>, AuthApiError> {
        let Some(token) = self.valid_access_token().await? else {
            return Ok(None);
        };

        match self.fetch_user(&token).await {
            Ok(identity) => Ok(Some(identity)),
            Err(AuthApiError::Api { status: 401, .. }) => {
                log::info!("auth: stored session rejected by provider; clearing");
                token_store::delete_session()?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Invalidate the provider-side session. The local session file is
    /// deleted regardless of the provider's answer.
    pub async fn sign_out(&self) -> Result<(), AuthApiError> {
        let stored = token_store::load_session()?;
        let result = match &stored {
            Some(session) => self.post_logout(session).await,
            None => Ok(()),
        };
        token_store::delete_session()?;
        result
    }

    /// Valid access token for authenticated REST calls, refreshing if
    /// expired. `Ok(None)` means signed out (including an unrefreshable
    /// session, which is cleared).
    pub async fn valid_access_token(&self) -> Result<Option<String>, AuthApiError> {
        let Some(session) = token_store::load_session()? else {
            return Ok(None);
        };
        if !is_session_expired(&session) {
            return Ok(Some(session.access_token));
        }
        match self.refresh_session(&session).await {
            Ok(refreshed) => Ok(Some(refreshed.access_token)),
            Err(AuthApiError::RefreshFailed(reason)) => {
                log::info!("auth: session refresh failed ({}); clearing stored session", reason);
                token_store::delete_session()?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn refresh_session(&self, session: &AuthSession) -> Result<AuthSession, AuthApiError> {
        let _guard = refresh_mutex().lock().await;

        // Another task may have refreshed while we waited for the lock.
        if let Some(current) = token_store::load_session()? {
            if !is_session_expired(&current) {
                return Ok(current);
            }
        }

        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthApiError::RefreshFailed("no refresh token stored".into()))?;

        let resp = self
            .client
            .post(self.auth_url("token?grant_type=refresh_token"))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthApiError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        let refreshed: AuthSession = resp.json().await?;
        token_store::save_session(&refreshed)?;
        Ok(refreshed)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Identity, AuthApiError> {
        let resp = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_auth_error(status, &body));
        }

        let user: AuthUser = resp.json().await?;
        Ok(user.into_identity())
    }

    async fn post_logout(&self, session: &AuthSession) -> Result<(), AuthApiError> {
        let resp = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        // 401 means the token was already invalid, which is the outcome we
        // wanted anyway.
        let status = resp.status();
        if !status.is_success() && status.as_u16() != 401 {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}

/// Map a non-success GoTrue body to the right error variant.
fn map_auth_error(status: u16, body: &str) -> AuthApiError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("invalid login credentials"))
    {
        return AuthApiError::InvalidCredentials;
    }

    // GoTrue error bodies carry the message under varying keys.
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string());

    AuthApiError::Api { status, message }
}

/// A signup response is either a full session (autoconfirm projects) or a
/// bare user object (email confirmation pending).
fn parse_signup_body(
    body: serde_json::Value,
) -> Result<(Option<AuthSession>, AuthUser), AuthApiError> {
    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body)?;
        let user = session
            .user
            .clone()
            .ok_or_else(|| AuthApiError::Api {
                status: 200,
                message: "signup session missing user object".into(),
            })?;
        Ok((Some(session), user))
    } else {
        let user: AuthUser = serde_json::from_value(body)?;
        Ok((None, user))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn current_identity(&self) -> Result<Option<Identity>, ProviderError> {
        SupabaseAuthClient::current_identity(self)
            .await
            .map_err(Into::into)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        SupabaseAuthClient::sign_out(self).await.map_err(Into::into)
    }
}
