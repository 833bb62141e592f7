// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process mock backend for integration tests.
//!
//! Serves a protected resource that accepts only known access tokens, a
//! renewal endpoint with scripted answers, and a couple of plain error routes.

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use artfit_client::{ApiClient, ClientConfig, CredentialStore, TokenPair};

/// Scripted renewal answer.
#[derive(Debug, Clone)]
pub struct RenewalReply {
    pub status: u16,
    pub body: Value,
}

impl RenewalReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: json!({ "detail": "Token is invalid or expired" }) }
    }
}

pub struct Backend {
    /// Access tokens the protected routes accept.
    pub valid: Mutex<HashSet<String>>,
    /// Whether a successful renewal makes its new token acceptable.
    pub accept_renewed: bool,
    pub renewal: RenewalReply,
    pub renewal_calls: AtomicU32,
    pub renewal_bodies: Mutex<Vec<Value>>,
    /// Authorization header of every protected request, in arrival order.
    pub seen_auth: Mutex<Vec<Option<String>>>,
    /// Holds renewal answers until a permit is added.
    pub renewal_gate: Option<Arc<Semaphore>>,
    /// Holds `/api/slow/` answers, decided at arrival, until a permit is added.
    pub slow_gate: Option<Arc<Semaphore>>,
}

impl Backend {
    pub fn new(renewal: RenewalReply) -> Self {
        Self {
            valid: Mutex::new(HashSet::new()),
            accept_renewed: true,
            renewal,
            renewal_calls: AtomicU32::new(0),
            renewal_bodies: Mutex::new(Vec::new()),
            seen_auth: Mutex::new(Vec::new()),
            renewal_gate: None,
            slow_gate: None,
        }
    }

    pub fn rejecting_renewed_tokens(mut self) -> Self {
        self.accept_renewed = false;
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.renewal_gate = Some(gate);
        self
    }

    pub fn slowed(mut self, gate: Arc<Semaphore>) -> Self {
        self.slow_gate = Some(gate);
        self
    }

    pub fn renewal_count(&self) -> u32 {
        self.renewal_calls.load(Ordering::SeqCst)
    }

    pub fn seen_with(&self, header: &str) -> usize {
        self.seen_auth.lock().iter().filter(|h| h.as_deref() == Some(header)).count()
    }
}

async fn protected(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    check_access(&backend, &headers)
}

async fn slow(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let verdict = check_access(&backend, &headers);
    if let Some(ref gate) = backend.slow_gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
    verdict
}

fn check_access(backend: &Backend, headers: &HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_owned);
    backend.seen_auth.lock().push(auth.clone());
    let token = auth.as_deref().and_then(|h| h.strip_prefix("Bearer "));
    match token {
        Some(t) if backend.valid.lock().contains(t) => {
            (StatusCode::OK, Json(json!({ "skills": ["illustration", "rust"] })))
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Given token not valid for any token type", "code": "token_not_valid" })),
        ),
    }
}

async fn renew(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    backend.renewal_calls.fetch_add(1, Ordering::SeqCst);
    backend.renewal_bodies.lock().push(body);
    if let Some(ref gate) = backend.renewal_gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
    let reply = backend.renewal.clone();
    if reply.status == 200 && backend.accept_renewed {
        if let Some(access) = reply.body.get("access").and_then(Value::as_str) {
            backend.valid.lock().insert(access.to_owned());
        }
    }
    (
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(reply.body),
    )
}

/// Start `backend` on an ephemeral port.
pub async fn spawn(backend: Arc<Backend>) -> anyhow::Result<SocketAddr> {
    let app = Router::new()
        .route("/api/skills/", get(protected))
        .route("/api/projects/", post(protected))
        .route("/api/slow/", get(slow))
        .route("/api/token/refresh/", post(renew))
        .route("/api/boom/", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route("/api/forbidden/", get(|| async { (StatusCode::FORBIDDEN, "nope") }))
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(addr)
}

pub fn client_for(addr: SocketAddr, store: Arc<CredentialStore>) -> anyhow::Result<ApiClient> {
    let config = ClientConfig::new(format!("http://{addr}/api"));
    Ok(ApiClient::with_store(&config, store)?)
}

pub fn store_with(access: &str, refresh: Option<&str>) -> Arc<CredentialStore> {
    let store = CredentialStore::in_memory();
    match refresh {
        Some(r) => store.set_pair(TokenPair { access: access.into(), refresh: r.into() }),
        None => store.set_access(Some(access.into())),
    }
    Arc::new(store)
}

/// Wait until the backend has seen `n` protected requests.
pub async fn wait_for_seen(backend: &Backend, n: usize) -> anyhow::Result<()> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while backend.seen_auth.lock().len() < n {
        if Instant::now() > deadline {
            anyhow::bail!("only {} of {n} requests arrived", backend.seen_auth.lock().len());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Ok(())
}

/// Wait until `n` requests are queued behind the in-flight renewal.
pub async fn wait_for_pending(client: &ApiClient, n: usize) -> anyhow::Result<()> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while client.coordinator().pending_len() < n {
        if Instant::now() > deadline {
            anyhow::bail!("only {} of {n} requests queued", client.coordinator().pending_len());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Ok(())
}
