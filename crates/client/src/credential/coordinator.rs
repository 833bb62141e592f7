// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight token renewal.
//!
//! Every request that fails authentication lands here. The first one while
//! idle starts exactly one renewal; the rest queue behind it. When the renewal
//! settles, the queue is drained in arrival order with the shared outcome.
//!
//! All state checks and writes happen under one mutex that is never held
//! across an `.await`, which keeps the idle-to-refreshing transition and the
//! queue append indivisible on a multi-threaded runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::credential::refresh::{RenewedTokens, TokenRenewer};
use crate::credential::store::CredentialStore;
use crate::credential::CredentialEvent;
use crate::error::{ClientError, RenewalError};

/// Outcome handed to each queued request: the access token to replay with,
/// or the reason the renewal failed.
type Outcome = Result<String, RenewalError>;

/// A queued request waiting for the in-flight renewal to settle.
type Continuation = oneshot::Sender<Outcome>;

/// Renewal state. At most one `Refreshing` exists per coordinator.
#[derive(Debug, Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing { pending: Vec<Continuation> },
}

/// What `admit` decided for one failed request.
enum Admission {
    /// No refresh token: fail now without a network call.
    NoRefreshToken,
    /// This request started the renewal.
    Started { refresh: String, rx: oneshot::Receiver<Outcome> },
    /// A renewal was already in flight.
    Queued(oneshot::Receiver<Outcome>),
}

/// Owns the renewal state machine for one client.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    store: Arc<CredentialStore>,
    renewer: TokenRenewer,
    renewals: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<CredentialStore>, renewer: TokenRenewer) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RefreshState::Idle),
            store,
            renewer,
            renewals: AtomicU64::new(0),
        })
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    /// Number of requests waiting on the in-flight renewal.
    pub fn pending_len(&self) -> usize {
        match &*self.state.lock() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { pending } => pending.len(),
        }
    }

    /// Number of renewal calls started over the coordinator's lifetime.
    pub fn renewals_started(&self) -> u64 {
        self.renewals.load(Ordering::SeqCst)
    }

    /// Obtain a renewed access token after an authentication failure.
    ///
    /// Joins the in-flight renewal if there is one, otherwise starts it.
    /// Resolves once the renewal settles. On any failure the credentials have
    /// already been cleared when this returns.
    pub async fn renew(self: &Arc<Self>) -> Result<String, ClientError> {
        let rx = match self.admit() {
            Admission::NoRefreshToken => {
                debug!("no refresh token, skipping renewal");
                self.sign_out("no refresh token");
                return Err(ClientError::NoRefreshToken);
            }
            Admission::Started { refresh, rx } => {
                self.spawn_renewal(refresh);
                rx
            }
            Admission::Queued(rx) => rx,
        };

        match rx.await {
            Ok(Ok(access)) => Ok(access),
            Ok(Err(e)) => Err(ClientError::Renewal(e)),
            Err(_) => Err(ClientError::Renewal(RenewalError::Abandoned)),
        }
    }

    fn admit(&self) -> Admission {
        let mut state = self.state.lock();
        if let RefreshState::Refreshing { pending } = &mut *state {
            let (tx, rx) = oneshot::channel();
            pending.push(tx);
            debug!(pending = pending.len(), "queued behind in-flight renewal");
            return Admission::Queued(rx);
        }

        let Some(refresh) = self.store.refresh() else {
            return Admission::NoRefreshToken;
        };
        let (tx, rx) = oneshot::channel();
        *state = RefreshState::Refreshing { pending: vec![tx] };
        debug!("starting token renewal");
        Admission::Started { refresh, rx }
    }

    /// Drive the renewal on its own task so the queue is drained even if the
    /// request that started it is dropped.
    fn spawn_renewal(self: &Arc<Self>, refresh: String) {
        self.renewals.fetch_add(1, Ordering::SeqCst);
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = coordinator.renewer.renew(&refresh).await;
            coordinator.settle(outcome);
        });
    }

    fn settle(&self, outcome: Result<RenewedTokens, RenewalError>) {
        // Credentials are written before the drain so replays see them.
        let result: Outcome = match outcome {
            Ok(tokens) => {
                let access = tokens.access.clone();
                let rotated = self.store.apply_renewal(tokens.access, tokens.refresh);
                info!(rotated, "access token renewed");
                self.store.emit(CredentialEvent::Renewed { rotated });
                Ok(access)
            }
            Err(e) => {
                warn!(err = %e, "token renewal failed, clearing credentials");
                self.sign_out(&e.to_string());
                Err(e)
            }
        };

        let pending = match std::mem::take(&mut *self.state.lock()) {
            RefreshState::Refreshing { pending } => pending,
            RefreshState::Idle => Vec::new(),
        };
        debug!(waiters = pending.len(), ok = result.is_ok(), "draining renewal queue");
        for tx in pending {
            // A closed receiver means that caller went away.
            let _ = tx.send(result.clone());
        }
    }

    fn sign_out(&self, reason: &str) {
        self.store.clear();
        self.store.emit(CredentialEvent::SignedOut { reason: reason.to_owned() });
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("pending", &self.pending_len())
            .field("renewals", &self.renewals_started())
            .finish()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
