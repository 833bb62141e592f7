// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: in-process mock backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

/// Handle to a running mock renewal endpoint.
pub struct MockRenewal {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicU32>,
    /// Raw request bodies, in arrival order.
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl MockRenewal {
    pub fn url(&self) -> String {
        format!("http://{}/token/refresh/", self.addr)
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Serve `responses` in order from `/token/refresh/`, repeating the last one.
///
/// When `gate` is set, each request waits for a permit before answering so a
/// test can hold the renewal in flight.
pub async fn mock_renewal_server(
    responses: Vec<(u16, String)>,
    gate: Option<Arc<Semaphore>>,
) -> anyhow::Result<MockRenewal> {
    let calls = Arc::new(AtomicU32::new(0));
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let responses = Arc::new(responses);

    let app = {
        let calls = Arc::clone(&calls);
        let bodies = Arc::clone(&bodies);
        Router::new().route(
            "/token/refresh/",
            post(move |body: String| {
                let calls = Arc::clone(&calls);
                let bodies = Arc::clone(&bodies);
                let resps = Arc::clone(&responses);
                let gate = gate.clone();
                async move {
                    let idx = calls.fetch_add(1, Ordering::SeqCst) as usize;
                    bodies.lock().push(body);
                    if let Some(gate) = gate {
                        if let Ok(permit) = gate.acquire().await {
                            permit.forget();
                        }
                    }
                    let (status, body) = resps
                        .get(idx)
                        .or_else(|| resps.last())
                        .cloned()
                        .unwrap_or((500, "{}".to_owned()));
                    (
                        axum::http::StatusCode::from_u16(status)
                            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
                        [(axum::http::header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                }
            }),
        )
    };

    let addr = serve(app).await?;
    Ok(MockRenewal { addr, calls, bodies })
}

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(addr)
}
