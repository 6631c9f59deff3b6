//! PostgREST client for the `profiles` table.
//!
//! Fetches use the signed-in user's JWT (RLS restricts rows to the owner),
//! falling back to the anon key when no session exists. An empty result set
//! is `Ok(None)`: profile rows are created lazily and many users never have
//! one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::auth::SupabaseAuthClient;
use super::AuthApiError;
use crate::config::SupabaseConfig;
use crate::providers::{ProfileStore, ProviderError};
use crate::types::{PlanTier, ProfileRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct SupabaseProfileClient {
    client: reqwest::Client,
    config: SupabaseConfig,
    auth: Arc<SupabaseAuthClient>,
}

impl SupabaseProfileClient {
    pub fn new(config: SupabaseConfig, auth: Arc<SupabaseAuthClient>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        SupabaseProfileClient {
            client,
            config,
            auth,
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/profiles",
            self.config.url.trim_end_matches('/')
        )
    }

    async fn bearer(&self) -> Result<String, AuthApiError> {
        Ok(self
            .auth
            .valid_access_token()
            .await?
            .unwrap_or_else(|| self.config.anon_key.clone()))
    }

    /// Fetch the profile row for `id`.
    pub async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRecord>, AuthApiError> {
        let bearer = self.bearer().await?;
        let resp = self
            .client
            .get(self.table_url())
            .query(&[
                ("id", format!("eq.{}", id).as_str()),
                ("select", "name,email,plan_tier"),
                ("limit", "1"),
            ])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let rows: Vec<ProfileRecord> = resp.json().await?;
        Ok(rows.into_iter().next())
    }

    /// Update the stored plan tier for `id`.
    ///
    /// This is the only write path for plan changes: screens never mutate
    /// plan state locally, they PATCH here and pick the new tier up on the
    /// next focus refresh.
    pub async fn set_plan_tier(&self, id: &str, tier: PlanTier) -> Result<(), AuthApiError> {
        let bearer = self.bearer().await?;
        let resp = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", id).as_str())])
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(bearer)
            .json(&serde_json::json!({ "plan_tier": tier }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileClient {
    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRecord>, ProviderError> {
        SupabaseProfileClient::profile_by_id(self, id)
            .await
            .map_err(Into::into)
    }
}
