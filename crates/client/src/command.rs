// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `artfit` subcommands.

use crate::error::ClientError;
use crate::upstream::account::Registration;
use crate::upstream::ApiClient;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Sign in with a username and password.
    Login {
        username: String,
        #[arg(long, env = "ARTFIT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a new account.
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ARTFIT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Marketplace role code (DEV, DES, BOTH).
        #[arg(long, default_value = "BOTH", value_parser = ["DEV", "DES", "BOTH"])]
        role: String,
    },
    /// Sign in with a Google ID token.
    Google { token: String },
    /// Forget the stored credentials.
    Logout,
    /// Show which credentials are stored (never their values).
    Status,
    /// GET a path and print the JSON response.
    Get { path: String },
    /// Renew the access token now.
    Refresh,
}

/// Run a subcommand. Returns a process exit code.
pub async fn run(client: &ApiClient, command: &Command) -> i32 {
    let result = match command {
        Command::Login { username, password } => {
            client.login(username, password).await.map(|()| None)
        }
        Command::Register { username, email, password, role } => {
            let registration = Registration {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
                role: role.clone(),
            };
            client.register(&registration).await.map(Some)
        }
        Command::Google { token } => client
            .google_sign_in(token)
            .await
            .map(|r| Some(serde_json::json!({ "user": r.user, "is_new_user": r.is_new_user }))),
        Command::Logout => {
            client.logout();
            Ok(None)
        }
        Command::Status => Ok(Some(status_json(client))),
        Command::Get { path } => client.get_json::<serde_json::Value>(path).await.map(Some),
        Command::Refresh => client.renew().await.map(|()| None),
    };

    match result {
        Ok(Some(value)) => {
            match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    return 1;
                }
            }
            0
        }
        Ok(None) => 0,
        Err(e) => report(&e),
    }
}

fn status_json(client: &ApiClient) -> serde_json::Value {
    let creds = client.store().snapshot();
    serde_json::json!({
        "api_base": client.base_url(),
        "has_access": creds.access.is_some(),
        "has_refresh": creds.refresh.is_some(),
        "credentials_path": client.store().path().map(|p| p.display().to_string()),
    })
}

fn report(err: &ClientError) -> i32 {
    eprintln!("error [{}]: {err}", err.code());
    if err.is_signed_out() {
        eprintln!("signed out; run `artfit login` to sign in again");
        3
    } else {
        1
    }
}
