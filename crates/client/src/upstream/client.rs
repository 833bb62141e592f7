// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated HTTP client for the backend API.

use std::sync::Arc;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credential::coordinator::RefreshCoordinator;
use crate::credential::refresh::TokenRenewer;
use crate::credential::store::CredentialStore;
use crate::credential::CredentialEvent;
use crate::error::ClientError;
use crate::upstream::decorate::authorize;
use crate::upstream::request::ApiRequest;

/// Replays allowed per request after a renewal.
pub const REPLAY_LIMIT: u32 = 1;

/// HTTP client that attaches credentials and recovers from expired access
/// tokens. Cheap to clone; clones share the store and the coordinator.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    login_path: String,
    http: reqwest::Client,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Build a client whose store follows `config` (file-backed or in-memory).
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let store = match config.credentials_path() {
            Some(path) => CredentialStore::open(path)?,
            None => CredentialStore::in_memory(),
        };
        Ok(Self::with_store(config, Arc::new(store))?)
    }

    /// Build a client around an existing store.
    pub fn with_store(
        config: &ClientConfig,
        store: Arc<CredentialStore>,
    ) -> Result<Self, ClientError> {
        config.validate().map_err(|e| ClientError::Config(e.to_string()))?;
        crate::tls::ensure_crypto();
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        let renewer = TokenRenewer::new(config.renewal_url(), config.timeout())?;
        let coordinator = RefreshCoordinator::new(Arc::clone(&store), renewer);
        Ok(Self {
            base_url: config.base_url(),
            login_path: config.login_path.clone(),
            http,
            store,
            coordinator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Subscribe to credential change events (renewal, sign-out).
    pub fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.store.subscribe()
    }

    /// Send a request with the stored access token.
    ///
    /// An unauthorized response hands control to the refresh coordinator and
    /// the request is replayed with the renewed token. If the store already
    /// holds a different access token than the one sent, a renewal settled
    /// while the request was in flight and the replay uses that token
    /// directly. A replay that is rejected again is returned as
    /// [`ClientError::Unauthorized`]. Every other status is returned
    /// untouched.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let mut retry = 0;
        let mut renewed: Option<String> = None;
        loop {
            let (resp, sent) = self.attempt(request, renewed.take()).await?;
            if resp.status() != StatusCode::UNAUTHORIZED {
                return Ok(resp);
            }
            if retry >= REPLAY_LIMIT {
                let body = resp.text().await.unwrap_or_default();
                warn!(method = %request.method(), path = request.path(), retry, "replay rejected as unauthorized");
                return Err(ClientError::Unauthorized { retries: retry, body });
            }
            renewed = match self.store.access() {
                Some(current) if sent.as_deref() != Some(current.as_str()) => {
                    debug!(method = %request.method(), path = request.path(), "access token changed in flight, replaying");
                    Some(current)
                }
                _ => {
                    debug!(method = %request.method(), path = request.path(), "unauthorized, awaiting token renewal");
                    Some(self.coordinator.renew().await?)
                }
            };
            retry += 1;
        }
    }

    /// One send, returning the access token it carried. The original is
    /// decorated from the store; a replay carries the token it was handed.
    async fn attempt(
        &self,
        request: &ApiRequest,
        renewed: Option<String>,
    ) -> Result<(Response, Option<String>), reqwest::Error> {
        let req = request.to_builder(&self.http, &self.base_url);
        let (req, sent) = match renewed {
            Some(token) => (req.bearer_auth(&token), Some(token)),
            None => authorize(req, &self.store),
        };
        Ok((req.send().await?, sent))
    }

    /// Send without credentials and without renewal handling.
    ///
    /// For sign-in and registration, where an unauthorized answer means bad
    /// input rather than an expired session.
    pub async fn send_anonymous(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        Ok(request.to_builder(&self.http, &self.base_url).send().await?)
    }

    /// Force a token renewal through the shared coordinator.
    pub async fn renew(&self) -> Result<(), ClientError> {
        self.coordinator.renew().await.map(|_| ())
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.send(&ApiRequest::get(path)).await?;
        read_json(resp).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(&ApiRequest::post(path).json(body)?).await?;
        read_json(resp).await
    }

    /// PUT a JSON body and decode the JSON response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(&ApiRequest::put(path).json(body)?).await?;
        read_json(resp).await
    }

    /// PATCH a JSON body and decode the JSON response.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(&ApiRequest::patch(path).json(body)?).await?;
        read_json(resp).await
    }

    /// DELETE a resource, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let resp = self.send(&ApiRequest::delete(path)).await?;
        check_status(resp).await.map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

/// Map a non-success status to [`ClientError::Status`].
pub async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { status: status.as_u16(), body })
}

/// Decode a JSON response body. An empty body decodes as `null`.
pub async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let bytes = check_status(resp).await?.bytes().await?;
    if bytes.is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
