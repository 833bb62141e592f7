// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::command::Command;
use crate::credential::persist::CREDENTIALS_FILE;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Connection settings for the backend API.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Base URL of the backend API.
    #[arg(long, default_value = DEFAULT_API_BASE, env = "ARTFIT_API_BASE")]
    pub api_base: String,

    /// Token renewal endpoint, relative to the base URL.
    #[arg(long, default_value = "/token/refresh/", env = "ARTFIT_REFRESH_PATH")]
    pub refresh_path: String,

    /// Username/password token endpoint, relative to the base URL.
    #[arg(long, default_value = "/token/", env = "ARTFIT_LOGIN_PATH")]
    pub login_path: String,

    /// Transport timeout for every request in milliseconds.
    #[arg(long, default_value_t = 30000, env = "ARTFIT_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Directory holding persisted credentials.
    #[arg(long, env = "ARTFIT_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Keep credentials in memory only.
    #[arg(long, env = "ARTFIT_EPHEMERAL")]
    pub ephemeral: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            refresh_path: "/token/refresh/".to_owned(),
            login_path: "/token/".to_owned(),
            timeout_ms: 30000,
            state_dir: None,
            ephemeral: false,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base.trim().is_empty() {
            anyhow::bail!("--api-base must not be empty");
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("--timeout-ms must be greater than zero");
        }
        for (flag, path) in [("--refresh-path", &self.refresh_path), ("--login-path", &self.login_path)]
        {
            if !path.starts_with('/') {
                anyhow::bail!("{flag} must start with '/': {path}");
            }
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        self.api_base.trim_end_matches('/').to_owned()
    }

    pub fn renewal_url(&self) -> String {
        format!("{}{}", self.base_url(), self.refresh_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Credentials file location, or `None` for an in-memory store.
    pub fn credentials_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            return None;
        }
        let dir = self.state_dir.clone().unwrap_or_else(crate::credential::state_dir);
        Some(dir.join(CREDENTIALS_FILE))
    }
}

/// Logging settings for the binary.
#[derive(Debug, Clone, clap::Args)]
pub struct LogConfig {
    /// Tracing filter directive.
    #[arg(long, default_value = "info", env = "ARTFIT_LOG")]
    pub log_level: String,

    /// Log output format (text, json).
    #[arg(long, default_value = "text", env = "ARTFIT_LOG_FORMAT")]
    pub log_format: String,
}

/// Command-line client for the ArtFit API.
#[derive(Debug, Parser)]
#[command(name = "artfit", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientConfig,

    #[command(flatten)]
    pub log: LogConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
