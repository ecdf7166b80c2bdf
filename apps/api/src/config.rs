use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::retry::RetryPolicy;

const DEFAULT_ROLE: &str = "Full Stack Developer (React/Node.js)";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; without `ANTHROPIC_API_KEY` the service
/// runs on local fallbacks only.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub redis_url: Option<String>,
    pub state_dir: PathBuf,
    pub interview_role: String,
    pub llm_max_attempts: u32,
    pub llm_retry_base_ms: u64,
    pub llm_retry_jitter_ms: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            redis_url: optional_env("REDIS_URL"),
            state_dir: optional_env("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            interview_role: optional_env("INTERVIEW_ROLE")
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 4)?,
            llm_retry_base_ms: parse_env("LLM_RETRY_BASE_MS", 1000)?,
            llm_retry_jitter_ms: parse_env("LLM_RETRY_JITTER_MS", 1000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.llm_max_attempts.max(1),
            base_delay: Duration::from_millis(self.llm_retry_base_ms),
            max_jitter: Duration::from_millis(self.llm_retry_jitter_ms),
        }
    }
}

/// Unset and blank values both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
