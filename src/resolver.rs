//! ProfileResolver: reconciles an auth-provider identity with its profile
//! row into one [`ResolvedSession`].
//!
//! The merge is a total function with a documented precedence chain; the
//! async wrapper adds the profile fetch and its fallback policy (not-found,
//! backend error, and timeout all degrade to identity-only fields, never to
//! a user-visible error).

use std::sync::Arc;
use std::time::Duration;

use crate::providers::ProfileStore;
use crate::types::{Identity, ProfileRecord, ResolvedSession};
use crate::util::{first_token, leading_initial};

const FULL_NAME_KEYS: &[&str] = &["full_name", "fullName"];
const FIRST_NAME_KEYS: &[&str] = &["first_name", "firstName"];

/// Upper bound on one profile fetch. Elapse is treated exactly like "no
/// record found" so a slow backend cannot pin screens on a stale snapshot.
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Merge an identity with an optional profile record.
///
/// Display-name precedence: profile name → metadata full name (first
/// whitespace segment) → metadata first name → identity email → "User".
/// Email precedence: profile email → identity email → empty. The initial is
/// always derived from the merged display name, so it can never mix sources.
pub fn merge(identity: &Identity, record: Option<&ProfileRecord>) -> ResolvedSession {
    let display_name = non_empty(record.and_then(|r| r.name.as_deref()))
        .or_else(|| {
            identity
                .metadata_str(FULL_NAME_KEYS)
                .map(|full| first_token(full).to_string())
        })
        .or_else(|| non_empty(identity.metadata_str(FIRST_NAME_KEYS)))
        .or_else(|| non_empty(identity.email.as_deref()))
        .unwrap_or_else(|| "User".to_string());

    let email_for_display = non_empty(record.and_then(|r| r.email.as_deref()))
        .or_else(|| non_empty(identity.email.as_deref()))
        .unwrap_or_default();

    let initial = leading_initial(&display_name)
        .map(String::from)
        .unwrap_or_default();

    ResolvedSession {
        is_authenticated: true,
        display_name,
        email_for_display,
        initial,
        plan_tier: record.and_then(|r| r.plan_tier).unwrap_or_default(),
    }
}

/// Fetch-and-merge orchestration around [`merge`].
pub struct ProfileResolver {
    profiles: Arc<dyn ProfileStore>,
    fetch_timeout: Duration,
}

impl ProfileResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self::with_timeout(profiles, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(profiles: Arc<dyn ProfileStore>, fetch_timeout: Duration) -> Self {
        ProfileResolver {
            profiles,
            fetch_timeout,
        }
    }

    /// Produce exactly one ResolvedSession for `identity`.
    ///
    /// A null identity short-circuits to the anonymous session with no
    /// profile fetch. A present identity issues one fetch keyed by its id;
    /// fetch failure or timeout is logged and falls back to identity-derived
    /// fields, indistinguishable from "no record found".
    pub async fn resolve(&self, identity: Option<&Identity>) -> ResolvedSession {
        let Some(identity) = identity else {
            return ResolvedSession::anonymous();
        };

        let record = match tokio::time::timeout(
            self.fetch_timeout,
            self.profiles.profile_by_id(&identity.id),
        )
        .await
        {
            Ok(Ok(record)) => record,
            Ok(Err(err)) => {
                log::warn!(
                    "profile fetch failed for {}: {} (using identity fields)",
                    identity.id,
                    err
                );
                None
            }
            Err(_) => {
                log::warn!(
                    "profile fetch for {} timed out after {:?} (using identity fields)",
                    identity.id,
                    self.fetch_timeout
                );
                None
            }
        };

        merge(identity, record.as_ref())
    }
}
