// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::credential::store::CredentialStore;

/// Attach the current access token as a bearer credential, if there is one.
/// Returns the token that was attached.
///
/// Runs before every decorated send. It never checks freshness and never
/// blocks on a renewal in progress.
pub fn authorize(
    req: reqwest::RequestBuilder,
    store: &CredentialStore,
) -> (reqwest::RequestBuilder, Option<String>) {
    match store.access() {
        Some(token) => (req.bearer_auth(&token), Some(token)),
        None => (req, None),
    }
}

#[cfg(test)]
#[path = "decorate_tests.rs"]
mod tests;
