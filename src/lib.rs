//! StudyPal session core.
//!
//! Answers, at any moment: who is the current user, what plan do they have,
//! and which menu actions are enabled. Screens render from immutable
//! [`types::ResolvedSession`] snapshots and never resolve identity
//! themselves.
//!
//! Flow: a screen gaining focus triggers [`refresh::FocusRefreshController`],
//! which fetches the identity, runs [`resolver::ProfileResolver`], and
//! commits the result into [`store::SessionStore`] through a sequence gate
//! (an older cycle completing late is discarded). [`gate`] derives the
//! view-facing booleans and menu lists from the committed snapshot, and
//! [`menu`] drives the profile dropdown. The [`supabase`] clients are the
//! production implementations of the [`providers`] traits.

pub mod config;
pub mod error;
pub mod gate;
pub mod menu;
pub mod providers;
pub mod refresh;
pub mod resolver;
pub mod store;
pub mod supabase;
pub mod types;
pub mod util;

#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use providers::NavigationHost;
use refresh::FocusRefreshController;
use store::SessionStore;
use supabase::auth::SupabaseAuthClient;
use supabase::profiles::SupabaseProfileClient;

pub use error::SessionError;
pub use types::{
    AvatarGlyph, Identity, MenuEntry, PlanTier, ProfileRecord, ResolvedSession, Screen,
};

/// Handles the shell keeps after wiring the core at app start.
pub struct SessionCore {
    pub store: Arc<SessionStore>,
    pub refresh: Arc<FocusRefreshController>,
    pub auth: Arc<SupabaseAuthClient>,
    pub profiles: Arc<SupabaseProfileClient>,
}

/// Wire the production core: resolve configuration, build the Supabase
/// clients, and connect the store and focus controller to `nav`. Created
/// once at app start; screens receive these handles by injection rather
/// than reaching for globals.
pub fn bootstrap(nav: Arc<dyn NavigationHost>) -> SessionCore {
    let config = config::SupabaseConfig::load();
    let auth = Arc::new(SupabaseAuthClient::new(config.clone()));
    let profiles = Arc::new(SupabaseProfileClient::new(config, auth.clone()));
    let store = Arc::new(SessionStore::new(auth.clone(), nav));
    let refresh = Arc::new(FocusRefreshController::new(
        store.clone(),
        auth.clone(),
        profiles.clone(),
    ));
    SessionCore {
        store,
        refresh,
        auth,
        profiles,
    }
}
