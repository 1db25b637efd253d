use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_STATE_DIR: &str = ".dashboard";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub log_level: String,
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_url = non_blank(std::env::var("DASHBOARD_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let state_dir = non_blank(std::env::var("DASHBOARD_STATE_DIR").ok())
            .unwrap_or_else(|| DEFAULT_STATE_DIR.to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());
        let http_connect_timeout_secs = parse_u64_env("HTTP_CONNECT_TIMEOUT_SECS", 5)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 15)?;

        Ok(Self {
            api_url,
            state_dir: PathBuf::from(state_dir),
            log_level,
            http_connect_timeout_secs,
            http_request_timeout_secs,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    parse_positive_u64(key, std::env::var(key).ok(), default)
}

fn parse_positive_u64(key: &str, raw: Option<String>, default: u64) -> Result<u64> {
    let value = raw
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
