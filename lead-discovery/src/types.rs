use std::env;
use std::time::Duration;
// Use the interfaces crate for the wire types
pub use interfaces::defs::{CityTiers, DiscoveryStatus, Lead, LeadStats, Rating};
pub use interfaces::defs::{StartRequest, StartResponse, StopResponse};

pub const API_URL_ENV: &str = "LEAD_DISCOVERY_API_URL";
const LEGACY_API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            user_agent: "Lead-Discovery/1.0".to_string(),
            timeout_seconds: 30,
            use_system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env::var(API_URL_ENV)
            .or_else(|_| env::var(LEGACY_API_URL_ENV))
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            config.base_url = url;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub active_interval: Duration,
    pub idle_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            active_interval: Duration::from_secs(3),
            idle_interval: Duration::from_secs(5),
        }
    }
}

impl PollConfig {
    pub fn interval_for(&self, is_running: bool) -> Duration {
        if is_running {
            self.active_interval
        } else {
            self.idle_interval
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    #[error("Command rejected: {message}")]
    CommandRejected { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid taxonomy: {0}")]
    Taxonomy(String),

    #[error("General error: {0}")]
    General(String),
}

impl DiscoveryError {
    /// Message suitable for showing to the operator as-is.
    pub fn operator_message(&self) -> String {
        match self {
            DiscoveryError::Backend { detail, .. } if !detail.is_empty() => detail.clone(),
            DiscoveryError::CommandRejected { message } => message.clone(),
            DiscoveryError::InvalidInput(message) => message.clone(),
            DiscoveryError::Http(e) if e.is_connect() || e.is_timeout() => {
                "Backend API is unreachable. Please check that it is running.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
