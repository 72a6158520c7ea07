use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// Primary environment variable holding the weather API key.
pub const API_KEY_ENV: &str = "FLIGHTPATH_WEATHER_API_KEY";
/// Fallback key variable recognised for compatibility with existing setups.
pub const FALLBACK_API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";
pub const BASE_URL_ENV: &str = "FLIGHTPATH_WEATHER_BASE_URL";
pub const TIMEOUT_ENV: &str = "FLIGHTPATH_WEATHER_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the forecast client.
///
/// The key is always passed in explicitly; nothing in the library reads it
/// from a global at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl WeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeatherConfigMissing`] when neither key variable is set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`WeatherConfig::from_env`] but reads variables through
    /// `lookup`, so tests can run in parallel without touching the real
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty(API_KEY_ENV)
            .or_else(|| non_empty(FALLBACK_API_KEY_ENV))
            .ok_or(Error::WeatherConfigMissing { env: API_KEY_ENV })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_empty(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("ignoring invalid {}={}", TIMEOUT_ENV, raw),
            }
        }
        Ok(config)
    }
}
