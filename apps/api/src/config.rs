use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_API_URL;
use crate::rate_limit::client_key::ClientKeySource;

/// Application configuration loaded from environment variables.
///
/// Nothing here is required at startup: a missing `DEEPSEEK_API_KEY` only
/// fails rewrite requests. Malformed values are a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    pub deepseek_api_key: Option<String>,
    pub deepseek_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
    pub rate_limit_sweep_interval: Duration,
    pub client_key_source: ClientKeySource,
    pub export_page_delay: Duration,
    pub font_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let trust_forwarded_for: bool = parse_env("TRUST_FORWARDED_FOR", false)?;

        Ok(Config {
            deepseek_api_key: optional_env("DEEPSEEK_API_KEY"),
            deepseek_api_url: optional_env("DEEPSEEK_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limit_max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 50)?,
            rate_limit_window: Duration::from_secs(parse_env("RATE_LIMIT_WINDOW_SECS", 3600)?),
            rate_limit_sweep_interval: Duration::from_secs(parse_env(
                "RATE_LIMIT_SWEEP_SECS",
                600,
            )?),
            client_key_source: if trust_forwarded_for {
                ClientKeySource::ForwardedFor
            } else {
                ClientKeySource::Peer
            },
            export_page_delay: Duration::from_millis(parse_env("EXPORT_PAGE_DELAY_MS", 600)?),
            font_dir: optional_env("FONT_DIR").map(PathBuf::from),
        })
        .and_then(Config::validated)
    }

    fn validated(self) -> Result<Self> {
        if self.rate_limit_max_requests == 0 {
            anyhow::bail!("RATE_LIMIT_MAX_REQUESTS must be at least 1");
        }
        if self.rate_limit_window.is_zero() || self.rate_limit_sweep_interval.is_zero() {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS and RATE_LIMIT_SWEEP_SECS must be positive");
        }
        Ok(self)
    }
}

/// Non-empty value of `key`, if set.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
