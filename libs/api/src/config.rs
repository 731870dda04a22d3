//! Client configuration.

use crate::error::ApiError;

/// Configuration for a device connection.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Base URL of the device management interface.
    pub base_url: String,

    /// API key, if already known. Can also be generated with
    /// [`HttpDeviceClient::keygen`](crate::client::HttpDeviceClient::keygen).
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Interval between job status polls, in seconds.
    pub poll_interval_secs: u64,

    /// Number of job status polls before giving up.
    pub poll_max_attempts: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            api_key: None,
            timeout_secs: 30,
            poll_interval_secs: 5,
            poll_max_attempts: 120,
        }
    }
}

impl DeviceConfig {
    /// Configuration for the given host with defaults for everything else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `FWSYNC_HOST`, `FWSYNC_API_KEY`,
    /// `FWSYNC_TIMEOUT`, `FWSYNC_POLL_INTERVAL`, `FWSYNC_POLL_MAX_ATTEMPTS`.
    pub fn from_env() -> Result<Self, ApiError> {
        let defaults = Self::default();

        let base_url = std::env::var("FWSYNC_HOST").unwrap_or(defaults.base_url);
        let api_key = std::env::var("FWSYNC_API_KEY").ok();

        let timeout_secs = parse_var("FWSYNC_TIMEOUT", defaults.timeout_secs)?;
        let poll_interval_secs = parse_var("FWSYNC_POLL_INTERVAL", defaults.poll_interval_secs)?;
        let poll_max_attempts = parse_var("FWSYNC_POLL_MAX_ATTEMPTS", defaults.poll_max_attempts)?;

        Ok(Self {
            base_url,
            api_key,
            timeout_secs,
            poll_interval_secs,
            poll_max_attempts,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ApiError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ApiError::Config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
