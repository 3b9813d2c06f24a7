// Runtime configuration, read from the environment.

use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "https://ssd.pingflood.tk/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the HTTP client and the token decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the shop API, without a trailing slash.
    pub api_url: String,
    /// Shared HS512 secret. When missing the user's role is not shown.
    pub jwt_secret: Option<String>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            jwt_secret: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read `DRESSY_API_URL`, `DRESSY_JWT_SECRET` and
    /// `DRESSY_HTTP_TIMEOUT_SECS`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("DRESSY_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_url = api_url.trim().trim_end_matches('/').to_string();

        let jwt_secret = lookup("DRESSY_JWT_SECRET").filter(|s| !s.is_empty());

        let timeout = match lookup("DRESSY_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("DRESSY_HTTP_TIMEOUT_SECS is not a number: {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            api_url,
            jwt_secret,
            timeout: Duration::from_secs(timeout),
        })
    }
}
