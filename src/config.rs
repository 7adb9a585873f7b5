use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin serving `/api/rentals/search` and the fleet endpoints
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Shared secret for the fleet admin endpoints
    pub fleet_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("rental-scout/{}", env!("CARGO_PKG_VERSION")),
            fleet_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("RENTAL_API_BASE_URL") {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("RENTAL_API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("RENTAL_API_TIMEOUT_SECS is not a number: {secs}"))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = get("RENTAL_API_USER_AGENT") {
            config.user_agent = agent;
        }
        config.fleet_key = get("FLEET_API_KEY");

        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}
