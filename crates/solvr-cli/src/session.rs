//! Per-invocation context: effective config, output mode, credentials.
//!
//! Resolution per key: command-line flag > `SOLVR_*` env > config file.
//! A session needs both a token and a user id; read-only commands work
//! without one.

use anyhow::Result;
use solvr_core::api::HttpApi;
use solvr_core::auth::{AuthContext, StaticAuth};
use solvr_core::config::{EffectiveConfig, Overrides, resolve_config};
use solvr_core::error::ErrorCode;
use std::env;
use std::time::Duration;
use tracing::warn;

use crate::output::{CliError, OutputMode, StderrSink, fail};

/// Environment reader trait for dependency injection in tests.
pub trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

/// Real environment reader.
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

pub struct Context {
    pub config: EffectiveConfig,
    pub output: OutputMode,
    pub quiet: bool,
}

impl Context {
    pub fn resolve(overrides: &Overrides, quiet: bool) -> Result<Self> {
        Self::resolve_with(overrides, quiet, &RealEnv)
    }

    fn resolve_with(overrides: &Overrides, quiet: bool, env: &dyn EnvReader) -> Result<Self> {
        let config = resolve_config(overrides, |key| env.get(key))?;
        Ok(Self::from_config(config, quiet))
    }

    pub fn from_config(config: EffectiveConfig, quiet: bool) -> Self {
        let output = OutputMode::from_resolved(&config.output);
        Self {
            config,
            output,
            quiet,
        }
    }

    /// Credentials from the effective config. A token without a user id is
    /// ignored: self-vote and ownership checks need to know who is asking.
    pub fn auth(&self) -> StaticAuth {
        match (&self.config.token, &self.config.user_id) {
            (Some(token), Some(user_id)) => StaticAuth::with_token(token.clone(), user_id.clone()),
            (Some(_), None) => {
                warn!("access token given without a user id; continuing signed out");
                StaticAuth::default()
            }
            _ => StaticAuth::default(),
        }
    }

    pub fn viewer(&self) -> Option<String> {
        self.auth().user_id()
    }

    /// REST client for the configured server. Without an API URL this
    /// prints the `E1002` error and fails.
    pub fn api(&self) -> Result<HttpApi<StaticAuth>> {
        let Ok(url) = self.config.require_api_url() else {
            return fail(self.output, &CliError::from_code(ErrorCode::MissingApiUrl));
        };
        Ok(HttpApi::new(
            url,
            self.auth(),
            Duration::from_secs(self.config.timeout_secs),
        )
        .with_page_size(self.config.page_size))
    }

    pub const fn sink(&self) -> StderrSink {
        StderrSink::new(self.output, self.quiet)
    }
}
