// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Why a token renewal did not produce a fresh access token.
///
/// Cloned once per queued request when a renewal settles, so every waiter
/// receives the same cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    /// The renewal endpoint answered with a non-success status.
    #[error("renewal rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    /// The renewal endpoint answered 2xx without an `access` field.
    #[error("renewal response missing access token")]
    Malformed,
    /// The renewal call never got a response.
    #[error("renewal transport error: {0}")]
    Transport(String),
    /// The renewal task ended without settling.
    #[error("renewal abandoned before completion")]
    Abandoned,
}

/// Errors surfaced by the authenticated HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Authentication failed and no refresh token was stored.
    #[error("session expired: no refresh token available")]
    NoRefreshToken,

    /// Authentication failed and the token renewal failed.
    #[error("token renewal failed: {0}")]
    Renewal(#[from] RenewalError),

    /// A request was rejected as unauthorized after its replay budget ran out.
    #[error("unauthorized after {retries} replay(s): {body}")]
    Unauthorized { retries: u32, body: String },

    /// Server returned a non-success status (typed helpers only).
    #[error("server error {status}: {body}")]
    Status { status: u16, body: String },

    /// Network-level failure on the original or replayed request.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A sign-in response did not carry both tokens.
    #[error("sign-in response missing access or refresh token")]
    MissingTokens,

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoRefreshToken => "NO_REFRESH_TOKEN",
            Self::Renewal(RenewalError::Rejected { .. }) => "RENEWAL_REJECTED",
            Self::Renewal(RenewalError::Malformed) => "RENEWAL_MALFORMED",
            Self::Renewal(RenewalError::Transport(_)) => "RENEWAL_TRANSPORT",
            Self::Renewal(RenewalError::Abandoned) => "RENEWAL_ABANDONED",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Status { .. } => "STATUS",
            Self::Transport(_) => "TRANSPORT",
            Self::Decode(_) => "DECODE",
            Self::MissingTokens => "MISSING_TOKENS",
            Self::Config(_) => "CONFIG",
        }
    }

    /// Whether this error ended the session (credentials were cleared).
    pub fn is_signed_out(&self) -> bool {
        matches!(self, Self::NoRefreshToken | Self::Renewal(_))
    }

    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Renewal(RenewalError::Rejected { status, .. }) => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
