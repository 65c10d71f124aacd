//! Relay configuration, read from the environment.

use axum::http::HeaderValue;
use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const MODEL_NAME: &str = "MODEL_NAME";
pub const BIND_ADDR: &str = "BIND_ADDR";
pub const CONNECT_TIMEOUT_SECS: &str = "CONNECT_TIMEOUT_SECS";
pub const IDLE_TIMEOUT_SECS: &str = "IDLE_TIMEOUT_SECS";
pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
pub const STATIC_DIR: &str = "STATIC_DIR";

const DEFAULT_BACKEND_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL_NAME: &str = "gpt-oss:20b";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    fn new(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self {
            key,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL of the inference service, without a trailing slash.
    pub backend_host: String,
    pub model_name: String,
    pub bind_addr: SocketAddr,
    pub connect_timeout: Duration,
    /// Longest wait for response headers or the next body chunk. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    pub allowed_origins: Vec<HeaderValue>,
    pub static_dir: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backend_host: DEFAULT_BACKEND_HOST.to_owned(),
            model_name: DEFAULT_MODEL_NAME.to_owned(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
            allowed_origins: Vec::new(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl RelayConfig {
    /// Reads the configuration from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_host = lookup(OLLAMA_HOST).unwrap_or_else(|| DEFAULT_BACKEND_HOST.to_owned());
        let url = Url::parse(&backend_host)
            .map_err(|e| ConfigError::new(OLLAMA_HOST, &backend_host, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::new(
                OLLAMA_HOST,
                &backend_host,
                "scheme must be http or https",
            ));
        }

        let model_name = lookup(MODEL_NAME).unwrap_or_else(|| DEFAULT_MODEL_NAME.to_owned());
        if model_name.trim().is_empty() {
            return Err(ConfigError::new(MODEL_NAME, &model_name, "must not be empty"));
        }

        let bind_addr = lookup(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = SocketAddr::from_str(&bind_addr)
            .map_err(|e| ConfigError::new(BIND_ADDR, &bind_addr, e))?;

        let connect_timeout = seconds(&lookup, CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let idle_timeout = seconds(&lookup, IDLE_TIMEOUT_SECS, DEFAULT_IDLE_TIMEOUT_SECS)?;

        let allowed_origins = match lookup(CORS_ALLOWED_ORIGINS) {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(|origin| {
                    origin
                        .parse::<HeaderValue>()
                        .map_err(|e| ConfigError::new(CORS_ALLOWED_ORIGINS, origin, e))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let static_dir = lookup(STATIC_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            backend_host: backend_host.trim_end_matches('/').to_owned(),
            model_name,
            bind_addr,
            connect_timeout,
            idle_timeout: (!idle_timeout.is_zero()).then_some(idle_timeout),
            allowed_origins,
            static_dir,
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.backend_host)
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        Some(value) => u64::from_str(value.trim())
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::new(key, &value, e)),
        None => Ok(Duration::from_secs(default)),
    }
}
