//! Trait seams to the external collaborators: auth provider, profile data
//! store, and the navigation host.
//!
//! The session core only ever talks to these traits; the Supabase clients in
//! [`crate::supabase`] are the production implementations and tests substitute
//! hand-rolled fakes.

use async_trait::async_trait;

use crate::types::{Identity, ProfileRecord, Screen};

/// Failure reaching an external collaborator.
///
/// These never propagate to screens: the refresh path collapses them to the
/// anonymous/fallback states described in the resolver and controller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        ProviderError(message.into())
    }
}

/// The auth backend: who is signed in, and session teardown.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current authenticated identity, or None when signed out.
    async fn current_identity(&self) -> Result<Option<Identity>, ProviderError>;

    /// Invalidate the provider-side session.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// The application's own profile table, keyed by identity id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row for `id`. `Ok(None)` means no row exists, which
    /// is a normal state, not an error.
    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRecord>, ProviderError>;
}

/// Callback invoked each time a subscribed screen becomes focused.
pub type FocusCallback = Box<dyn Fn() + Send + Sync>;

/// The shell's navigation layer: route changes and focus events.
pub trait NavigationHost: Send + Sync {
    fn navigate_to(&self, screen: Screen);

    /// Subscribe `callback` to this host's screen-focus transitions.
    fn on_focus(&self, callback: FocusCallback);
}
