//! Backend selection from the external identity signal.
//!
//! The identity signal is opaque to this layer: either there is no
//! identity (local mode) or there is one (remote mode, scoped to it).
//! [`BackendSelector`] gates the load sequence so it runs exactly once per
//! settled identity, and again on every identity transition.

/// The opaque identity signal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No identity: the device-local store is authoritative.
    Anonymous,
    /// An identity: the remote backend is authoritative, scoped to it.
    User(String),
}

impl Identity {
    /// The owner string for remote scoping, if an identity is present.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User(owner) => Some(owner),
        }
    }
}

/// Which backend is authoritative for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Device-local persistent store.
    Local,
    /// Remote relational backend with a change feed.
    Remote,
}

/// The externally observed identity state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySignal {
    /// The identity provider has not settled yet.
    pub identity_loading: bool,
    /// The backend client is ready to serve requests.
    pub client_ready: bool,
    /// The settled identity, meaningful once the gates pass.
    pub identity: Identity,
}

impl IdentitySignal {
    /// A settled signal for `identity`.
    #[must_use]
    pub fn settled(identity: Identity) -> Self {
        Self {
            identity_loading: false,
            client_ready: true,
            identity,
        }
    }
}

/// Decides when a load sequence must run, and against which backend.
///
/// Yields a mode exactly when both gates pass and the identity differs
/// from the last one loaded. Re-observing an unchanged identity is a
/// no-op; a sign-in or sign-out transition fires again.
#[derive(Debug, Default)]
pub struct BackendSelector {
    last_loaded: Option<Identity>,
}

impl BackendSelector {
    /// Creates a selector that has not loaded anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes a signal; returns the mode to (re)load for, if any.
    pub fn observe(&mut self, signal: &IdentitySignal) -> Option<BackendMode> {
        if signal.identity_loading || !signal.client_ready {
            return None;
        }
        if self.last_loaded.as_ref() == Some(&signal.identity) {
            return None;
        }
        self.last_loaded = Some(signal.identity.clone());
        Some(match signal.identity {
            Identity::Anonymous => BackendMode::Local,
            Identity::User(_) => BackendMode::Remote,
        })
    }

    /// Forgets the loaded identity, so the next settled signal fires again.
    pub fn reset(&mut self) {
        self.last_loaded = None;
    }
}
