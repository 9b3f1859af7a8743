//! Engine configuration
//!
//! Connection settings for the CI engine API and the cadence of result
//! polling.

use std::time::Duration;

/// Default address of the CI engine API
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// CI engine API base URL (e.g., "http://localhost:5000")
    pub api_url: String,

    /// Delay between result polls of a watched execution
    pub poll_interval: Duration,

    /// Network timeout for each request to the CI engine
    pub request_timeout: Duration,

    /// Default history window, in days
    pub history_days: u32,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            history_days: 7,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JOBDECK_API_URL (optional, default: http://localhost:5000)
    /// - JOBDECK_POLL_INTERVAL (optional, seconds, default: 30)
    /// - JOBDECK_REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - JOBDECK_HISTORY_DAYS (optional, default: 7)
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url =
            std::env::var("JOBDECK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let mut config = Self::new(api_url);

        if let Some(secs) = env_number::<u64>("JOBDECK_POLL_INTERVAL")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number::<u64>("JOBDECK_REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(days) = env_number::<u32>("JOBDECK_HISTORY_DAYS")? {
            config.history_days = days;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.history_days == 0 {
            anyhow::bail!("history_days must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.to_string())
    }
}

/// Reads an optional numeric variable; a set but unparsable value is an error
fn env_number<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.history_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.api_url = "localhost:5000".to_string();
        assert!(config.validate().is_err());

        config.api_url = "https://ci.example.com".to_string();
        assert!(config.validate().is_ok());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.poll_interval = Duration::from_secs(5);
        config.history_days = 0;
        assert!(config.validate().is_err());
    }
}
