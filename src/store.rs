//! SessionStore: the single shared holder of the current resolved session.
//!
//! Writer discipline: refresh cycles write through `begin_refresh` /
//! `commit_if_latest` (sequence-gated, so an older cycle that completes late
//! is discarded), and `sign_out` resets atomically after bumping the same
//! sequence so no in-flight refresh can resurrect an authenticated snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::providers::{AuthProvider, NavigationHost};
use crate::types::{Identity, ResolvedSession, Screen};

struct Snapshot {
    identity: Option<Identity>,
    session: ResolvedSession,
}

pub struct SessionStore {
    auth: Arc<dyn AuthProvider>,
    nav: Arc<dyn NavigationHost>,
    inner: RwLock<Snapshot>,
    /// Latest issued refresh sequence number. Sign-out bumps it too.
    seq: AtomicU64,
    changed: watch::Sender<ResolvedSession>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthProvider>, nav: Arc<dyn NavigationHost>) -> Self {
        let (changed, _) = watch::channel(ResolvedSession::anonymous());
        SessionStore {
            auth,
            nav,
            inner: RwLock::new(Snapshot {
                identity: None,
                session: ResolvedSession::anonymous(),
            }),
            seq: AtomicU64::new(0),
            changed,
        }
    }

    /// Latest resolved session. Never blocks; returns the anonymous snapshot
    /// until the first refresh commits.
    pub fn current(&self) -> ResolvedSession {
        self.inner.read().session.clone()
    }

    /// Raw identity backing the current snapshot, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.inner.read().identity.clone()
    }

    /// Receiver that observes every committed snapshot. The shell uses this
    /// to re-render identity-dependent chrome without polling.
    pub fn subscribe(&self) -> watch::Receiver<ResolvedSession> {
        self.changed.subscribe()
    }

    /// Issue a new refresh sequence number. Every focus-refresh cycle calls
    /// this exactly once, at issue time, before any fetch starts.
    pub fn begin_refresh(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a refresh result if and only if `seq` is still the latest
    /// issued sequence. Returns false when the result was stale and
    /// discarded; that outcome is silent and expected, never user-visible.
    pub fn commit_if_latest(
        &self,
        seq: u64,
        identity: Option<Identity>,
        session: ResolvedSession,
    ) -> bool {
        let mut guard = self.inner.write();
        let latest = self.seq.load(Ordering::SeqCst);
        if seq != latest {
            log::debug!(
                "session refresh: discarding stale result (cycle {} superseded by {})",
                seq,
                latest
            );
            return false;
        }
        guard.identity = identity;
        guard.session = session.clone();
        // Broadcast while still holding the lock: watch sends never block,
        // and publishing outside it would let a sign-out's anonymous value be
        // overwritten on the channel by this commit even though the snapshot
        // check passed first.
        let _ = self.changed.send(session);
        true
    }

    /// Sign the user out.
    ///
    /// The provider call is awaited first; if it fails the failure is logged
    /// and the local reset proceeds anyway — "log me out" wins over backend
    /// confirmation. The sequence bump happens before the reset so a refresh
    /// already in flight commits against a stale number and is discarded.
    /// Post-condition: `current().is_authenticated == false`, and navigation
    /// has been pointed at the login screen.
    pub async fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            log::warn!(
                "sign-out: provider rejected ({}); resetting local session anyway",
                err
            );
        }

        self.seq.fetch_add(1, Ordering::SeqCst);
        {
            let mut guard = self.inner.write();
            guard.identity = None;
            guard.session = ResolvedSession::anonymous();
            // Same discipline as commit_if_latest: snapshot and channel are
            // updated under one lock so they can never diverge.
            let _ = self.changed.send(ResolvedSession::anonymous());
        }
        log::info!("sign-out: local session reset");

        self.nav.navigate_to(Screen::Login);
    }
}
