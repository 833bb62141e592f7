// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: the process-wide holder of the access/refresh pair.
//!
//! Reads return the current snapshot. Every write goes through one mutex and,
//! when the store is file-backed, is persisted before the lock is released so
//! the file never lags behind a later write. No expiry is computed here; a
//! token is only known to be stale when the backend rejects it.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::credential::persist;
use crate::credential::{CredentialEvent, Credentials, TokenPair};

pub struct CredentialStore {
    inner: Mutex<Credentials>,
    path: Option<PathBuf>,
    event_tx: broadcast::Sender<CredentialEvent>,
}

impl CredentialStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_state(Credentials::default(), None)
    }

    /// File-backed store. Loads whatever pair was persisted previously.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let creds = persist::load(&path)?;
        debug!(
            path = %path.display(),
            has_access = creds.access.is_some(),
            has_refresh = creds.refresh.is_some(),
            "loaded credentials"
        );
        Ok(Self::with_state(creds, Some(path)))
    }

    fn with_state(creds: Credentials, path: Option<PathBuf>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self { inner: Mutex::new(creds), path, event_tx }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn access(&self) -> Option<String> {
        self.inner.lock().access.clone()
    }

    pub fn refresh(&self) -> Option<String> {
        self.inner.lock().refresh.clone()
    }

    pub fn snapshot(&self) -> Credentials {
        self.inner.lock().clone()
    }

    /// Replace the access token. `None` removes it.
    pub fn set_access(&self, value: Option<String>) {
        self.update(|c| c.access = value);
    }

    /// Replace the refresh token. `None` removes it.
    pub fn set_refresh(&self, value: Option<String>) {
        self.update(|c| c.refresh = value);
    }

    /// Store a pair handed over by a login or sign-in flow.
    pub fn set_pair(&self, pair: TokenPair) {
        self.update(|c| {
            c.access = Some(pair.access);
            c.refresh = Some(pair.refresh);
        });
        self.emit(CredentialEvent::Stored);
    }

    /// Remove both tokens in one write.
    pub fn clear(&self) {
        self.update(|c| *c = Credentials::default());
    }

    /// Record a successful renewal. Returns whether the refresh token rotated.
    pub(crate) fn apply_renewal(&self, access: String, refresh: Option<String>) -> bool {
        let rotated = refresh.is_some();
        self.update(|c| {
            c.access = Some(access);
            if let Some(rt) = refresh {
                c.refresh = Some(rt);
            }
        });
        rotated
    }

    /// Subscribe to credential change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn emit(&self, event: CredentialEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    fn update(&self, f: impl FnOnce(&mut Credentials)) {
        let mut creds = self.inner.lock();
        f(&mut creds);
        if let Some(ref path) = self.path {
            if let Err(e) = persist::save(path, &creds) {
                warn!(path = %path.display(), err = %e, "failed to persist credentials");
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let creds = self.inner.lock();
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("has_access", &creds.access.is_some())
            .field("has_refresh", &creds.refresh.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
