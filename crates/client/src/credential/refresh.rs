// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token renewal call.
//!
//! Owns its own HTTP client: the renewal request is never decorated and never
//! observed by the refresh coordinator, so a rejected renewal cannot trigger
//! another renewal. No retries happen here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, RenewalError};

/// Renewal request body.
#[derive(Debug, Serialize)]
struct RenewRequest<'a> {
    refresh: &'a str,
}

/// Renewal response body. `access` is optional here so a 2xx without it can
/// be reported as malformed instead of a decode failure.
#[derive(Debug, Deserialize)]
struct RenewResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

/// Tokens returned by a successful renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewedTokens {
    pub access: String,
    /// Present only when the backend rotated the refresh token.
    pub refresh: Option<String>,
}

/// Client for the token renewal endpoint.
#[derive(Debug, Clone)]
pub struct TokenRenewer {
    url: String,
    http: reqwest::Client,
}

impl TokenRenewer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        crate::tls::ensure_crypto();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url: url.into(), http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Exchange a refresh token for a new access token.
    pub async fn renew(&self, refresh_token: &str) -> Result<RenewedTokens, RenewalError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&RenewRequest { refresh: refresh_token })
            .send()
            .await
            .map_err(|e| RenewalError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RenewalError::Rejected { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await.map_err(|e| RenewalError::Transport(e.to_string()))?;
        let parsed: RenewResponse =
            serde_json::from_slice(&bytes).map_err(|_| RenewalError::Malformed)?;
        match parsed.access {
            Some(access) if !access.is_empty() => {
                Ok(RenewedTokens { access, refresh: parsed.refresh.filter(|r| !r.is_empty()) })
            }
            _ => Err(RenewalError::Malformed),
        }
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
