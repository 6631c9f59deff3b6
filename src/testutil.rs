//! Hand-rolled collaborator fakes shared by the store/refresh/menu tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::providers::{AuthProvider, FocusCallback, NavigationHost, ProfileStore, ProviderError};
use crate::types::{Identity, ProfileRecord, Screen};

/// Build an Identity with string metadata entries.
pub fn identity(id: &str, email: Option<&str>, metadata: &[(&str, &str)]) -> Identity {
    let mut bag = serde_json::Map::new();
    for (key, value) in metadata {
        bag.insert((*key).to_string(), serde_json::json!(value));
    }
    Identity {
        id: id.to_string(),
        email: email.map(str::to_string),
        metadata: bag,
    }
}

/// Auth fake whose `current_identity` answers are scripted per call, each
/// with its own artificial delay. Panics if called more times than scripted.
pub struct ScriptedAuth {
    script: Mutex<VecDeque<(Duration, Result<Option<Identity>, ProviderError>)>>,
    fail_sign_out: bool,
    sign_out_calls: AtomicUsize,
}

impl ScriptedAuth {
    pub fn new() -> Self {
        ScriptedAuth {
            script: Mutex::new(VecDeque::new()),
            fail_sign_out: false,
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    /// Variant whose provider-side sign-out always fails.
    pub fn failing_sign_out() -> Self {
        ScriptedAuth {
            fail_sign_out: true,
            ..ScriptedAuth::new()
        }
    }

    pub fn push(&self, delay: Duration, result: Result<Option<Identity>, ProviderError>) {
        self.script.lock().push_back((delay, result));
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for ScriptedAuth {
    async fn current_identity(&self) -> Result<Option<Identity>, ProviderError> {
        let (delay, result) = self
            .script
            .lock()
            .pop_front()
            .expect("unscripted current_identity call");
        tokio::time::sleep(delay).await;
        result
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            Err(ProviderError::new("provider rejected sign-out"))
        } else {
            Ok(())
        }
    }
}

/// In-memory profile table with an optional per-fetch delay or forced error.
pub struct FakeProfiles {
    records: Mutex<HashMap<String, ProfileRecord>>,
    delay: Mutex<Duration>,
    fail: Mutex<bool>,
}

impl FakeProfiles {
    pub fn new() -> Self {
        FakeProfiles {
            records: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            fail: Mutex::new(false),
        }
    }

    pub fn insert(&self, id: &str, record: ProfileRecord) {
        self.records.lock().insert(id.to_string(), record);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRecord>, ProviderError> {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.fail.lock() {
            return Err(ProviderError::new("profile backend unavailable"));
        }
        Ok(self.records.lock().get(id).cloned())
    }
}

/// Navigation host that records route changes and lets tests fire focus
/// events by hand.
pub struct RecordingNav {
    visits: Mutex<Vec<Screen>>,
    callbacks: Mutex<Vec<FocusCallback>>,
}

impl RecordingNav {
    pub fn new() -> Self {
        RecordingNav {
            visits: Mutex::new(Vec::new()),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn visits(&self) -> Vec<Screen> {
        self.visits.lock().clone()
    }

    /// Simulate a screen gaining focus.
    pub fn fire_focus(&self) {
        for callback in self.callbacks.lock().iter() {
            callback();
        }
    }
}

impl NavigationHost for RecordingNav {
    fn navigate_to(&self, screen: Screen) {
        self.visits.lock().push(screen);
    }

    fn on_focus(&self, callback: FocusCallback) {
        self.callbacks.lock().push(callback);
    }
}
