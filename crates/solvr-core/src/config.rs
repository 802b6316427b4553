use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REDACTED: &str = "********";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Contents of `<config_dir>/solvr/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Values given on the command line. They beat env vars and the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub json: bool,
    pub format: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub api_url: Option<String>,
    pub output: String,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub source: Option<PathBuf>,
}

impl EffectiveConfig {
    pub fn require_api_url(&self) -> Result<&str> {
        match self.api_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => bail!(
                "{}: {}",
                ErrorCode::MissingApiUrl.code(),
                ErrorCode::MissingApiUrl.message()
            ),
        }
    }

    /// Copy safe to print: the token is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| REDACTED.to_string()),
            ..self.clone()
        }
    }
}

#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("solvr/config.toml"))
}

pub fn load_user_config() -> Result<(UserConfig, Option<PathBuf>)> {
    let Some(path) = user_config_path() else {
        return Ok((UserConfig::default(), None));
    };
    if !path.exists() {
        return Ok((UserConfig::default(), None));
    }
    let config = load_config_from(&path)?;
    Ok((config, Some(path)))
}

pub fn load_config_from(path: &Path) -> Result<UserConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content).with_context(|| {
        format!(
            "{}: Failed to parse {}",
            ErrorCode::ConfigParseError.code(),
            path.display()
        )
    })
}

/// Load the user config file and layer env and flags over it.
pub fn resolve_config(
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<EffectiveConfig> {
    let (user, source) = load_user_config()?;
    resolve_with(user, source, overrides, env)
}

/// Precedence per key: flag, env var, file, default.
pub fn resolve_with(
    user: UserConfig,
    source: Option<PathBuf>,
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<EffectiveConfig> {
    let env_format = overrides.format.clone().or_else(|| env("FORMAT"));
    let output = resolve_output(overrides.json, user.output.clone(), env_format)?;

    let pick = |flag: &Option<String>, var: &str, file: Option<String>| {
        flag.clone()
            .or_else(|| env(var).filter(|v| !v.is_empty()))
            .or(file)
    };

    Ok(EffectiveConfig {
        api_url: pick(&overrides.api_url, "SOLVR_API_URL", user.api_url),
        output,
        page_size: user.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        timeout_secs: user.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        token: pick(&overrides.token, "SOLVR_TOKEN", user.auth.token),
        user_id: pick(&overrides.user_id, "SOLVR_USER_ID", user.auth.user_id),
        source,
    })
}

pub fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> Result<String> {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return Ok("json".to_string());
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if std::io::stdout().is_terminal() {
        Ok("pretty".to_string())
    } else {
        Ok("text".to_string())
    }
}
