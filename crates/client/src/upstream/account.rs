// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account flows that produce or discard credentials.
//!
//! Sign-in and registration go out anonymously; any response carrying both
//! `access` and `refresh` is handed to the credential store before the call
//! returns.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::credential::{CredentialEvent, TokenPair};
use crate::error::ClientError;
use crate::upstream::client::{read_json, ApiClient};
use crate::upstream::request::ApiRequest;

pub const REGISTER_PATH: &str = "/accounts/register/";
pub const GOOGLE_AUTH_PATH: &str = "/accounts/google-auth/";
pub const ME_PATH: &str = "/accounts/me/";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct GoogleAuthRequest<'a> {
    token: &'a str,
}

/// New account details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Marketplace role code: `DEV`, `DES`, or `BOTH`.
    pub role: String,
}

/// Result of an external (Google) sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSignIn {
    #[serde(default)]
    pub user: serde_json::Value,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Extract a token pair from a producer response, if both halves are present.
fn token_pair(body: &serde_json::Value) -> Option<TokenPair> {
    let access = body.get("access")?.as_str().filter(|s| !s.is_empty())?;
    let refresh = body.get("refresh")?.as_str().filter(|s| !s.is_empty())?;
    Some(TokenPair { access: access.to_owned(), refresh: refresh.to_owned() })
}

impl ApiClient {
    /// Exchange a username and password for a token pair and store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post(self.login_path()).json(&LoginRequest { username, password })?;
        let body: serde_json::Value = read_json(self.send_anonymous(&request).await?).await?;
        let pair = token_pair(&body).ok_or(ClientError::MissingTokens)?;
        self.store().set_pair(pair);
        info!(username, "signed in");
        Ok(())
    }

    /// Create an account. Stores tokens if the backend returns a pair.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<serde_json::Value, ClientError> {
        let request = ApiRequest::post(REGISTER_PATH).json(registration)?;
        let body: serde_json::Value = read_json(self.send_anonymous(&request).await?).await?;
        if let Some(pair) = token_pair(&body) {
            self.store().set_pair(pair);
        }
        info!(username = %registration.username, "registered");
        Ok(body)
    }

    /// Exchange an external ID token for the backend's sign-in answer.
    ///
    /// The pair is stored only when both tokens are present; the answer is
    /// returned either way.
    pub async fn google_sign_in(&self, id_token: &str) -> Result<GoogleSignIn, ClientError> {
        let request = ApiRequest::post(GOOGLE_AUTH_PATH).json(&GoogleAuthRequest { token: id_token })?;
        let body: serde_json::Value = read_json(self.send_anonymous(&request).await?).await?;
        match token_pair(&body) {
            Some(pair) => {
                self.store().set_pair(pair);
                info!("signed in with google");
            }
            None => warn!("google sign-in answer carried no token pair"),
        }
        let result: GoogleSignIn = serde_json::from_value(body)?;
        Ok(result)
    }

    /// Fetch the signed-in user's profile.
    pub async fn me(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json(ME_PATH).await
    }

    /// Drop both tokens.
    pub fn logout(&self) {
        self.store().clear();
        self.store().emit(CredentialEvent::SignedOut { reason: "logout".to_owned() });
        info!("signed out");
    }

    /// Whether an access token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.store().access().is_some()
    }
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
