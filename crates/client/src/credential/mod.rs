// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential handling: the persisted token pair, the renewal call, and the
//! single-flight coordinator that recovers from expired access tokens.
//!
//! The store is the only holder of tokens. The coordinator is the only writer
//! besides explicit login/logout. The renewal client talks to the backend on
//! its own `reqwest::Client` so it can never re-enter the coordinator.

pub mod coordinator;
pub mod persist;
pub mod refresh;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Snapshot of the current token pair. Either half may be absent.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Token pair returned by login, registration, or external sign-in flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Events emitted whenever the stored credentials change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CredentialEvent {
    /// A producer flow stored a fresh token pair.
    Stored,
    /// A renewal replaced the access token. `rotated` is set when the
    /// refresh token was replaced as well.
    Renewed { rotated: bool },
    /// Credentials were cleared.
    SignedOut { reason: String },
}

/// Resolve the state directory for client data.
///
/// Checks `ARTFIT_STATE_DIR`, then `$XDG_STATE_HOME/artfit`,
/// then `$HOME/.local/state/artfit`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ARTFIT_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("artfit");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/artfit");
    }
    PathBuf::from(".artfit")
}
