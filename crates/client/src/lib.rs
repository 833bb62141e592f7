// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side access layer for the ArtFit API.
//!
//! [`ApiClient`] attaches the stored access token to every request. When the
//! backend answers unauthorized, the refresh coordinator renews the token
//! once for all concurrent failures and the failed requests are replayed.

pub mod command;
pub mod config;
pub mod credential;
pub mod error;
pub mod tls;
pub mod upstream;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use credential::store::CredentialStore;
pub use credential::{CredentialEvent, Credentials, TokenPair};
pub use error::{ClientError, RenewalError};
pub use upstream::{ApiClient, ApiRequest};

/// Run a CLI invocation. Returns a process exit code.
pub async fn run(cli: config::Cli) -> i32 {
    if let Err(e) = cli.client.validate() {
        eprintln!("error: {e}");
        return 2;
    }
    let client = match ApiClient::new(&cli.client) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:#}");
            return 1;
        }
    };
    command::run(&client, &cli.command).await
}
