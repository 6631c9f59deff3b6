//! FocusRefreshController: re-resolves the session every time a screen that
//! shows identity-dependent UI gains focus.
//!
//! The policy is deliberately "always refresh on focus", never cached, so
//! login/logout/profile edits performed on one screen are visible on the
//! next screen the moment it appears. Staleness across overlapping cycles is
//! handled by the store's sequence gate, not by cancelling network work: a
//! superseded cycle runs to completion and its result is dropped.

use std::sync::Arc;

use crate::providers::{AuthProvider, NavigationHost, ProfileStore};
use crate::resolver::ProfileResolver;
use crate::store::SessionStore;

pub struct FocusRefreshController {
    store: Arc<SessionStore>,
    auth: Arc<dyn AuthProvider>,
    resolver: ProfileResolver,
}

impl FocusRefreshController {
    pub fn new(
        store: Arc<SessionStore>,
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        FocusRefreshController {
            store,
            auth,
            resolver: ProfileResolver::new(profiles),
        }
    }

    /// Run one refresh cycle.
    ///
    /// Sequence is taken at issue time, before the identity fetch starts, so
    /// ordering is by issue, not by completion. Failure to reach the auth
    /// provider is treated as "no identity", never as a UI error state. The
    /// identity fetch always completes (or resolves to None) before the
    /// profile merge runs; the profile fetch is never started speculatively.
    pub async fn handle_focus(&self) {
        let seq = self.store.begin_refresh();

        let identity = match self.auth.current_identity().await {
            Ok(identity) => identity,
            Err(err) => {
                log::info!(
                    "session refresh: auth provider unreachable ({}); treating as signed out",
                    err
                );
                None
            }
        };

        let session = self.resolver.resolve(identity.as_ref()).await;
        if !self.store.commit_if_latest(seq, identity, session) {
            log::debug!("session refresh: cycle {} superseded", seq);
        }
    }

    /// Subscribe this controller to `host`'s focus events. Called once per
    /// identity-displaying screen; every subscription shares the store's one
    /// sequence counter, so screens never race each other's results.
    ///
    /// Must be called from within a tokio runtime (app wiring). The runtime
    /// handle is captured here so focus events themselves may fire from any
    /// thread, including the shell's UI thread.
    pub fn attach(self: &Arc<Self>, host: &dyn NavigationHost) {
        let controller = Arc::clone(self);
        let runtime = tokio::runtime::Handle::current();
        host.on_focus(Box::new(move || {
            let controller = Arc::clone(&controller);
            runtime.spawn(async move {
                controller.handle_focus().await;
            });
        }));
    }
}
