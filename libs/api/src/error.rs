//! Error types for the device API surface.

use thiserror::Error;

/// Errors raised while talking to the device.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure at any stage. Fatal to the calling flow; no
    /// partial device state may be assumed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The device returned XML that could not be parsed.
    #[error("malformed device response: {0}")]
    Xml(String),

    /// A response was parsed but a required element was missing.
    #[error("missing field in device response: {0}")]
    MissingField(&'static str),

    /// API key generation or storage failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A polled job did not reach a terminal status within the poller's
    /// attempt budget.
    #[error("job '{job_id}' still running after {attempts} poll attempts")]
    JobTimeout { job_id: String, attempts: u32 },

    /// A requested job does not exist on the device.
    #[error("Requested job not found.")]
    JobNotFound(String),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Connection(err.to_string())
    }
}

impl From<roxmltree::Error> for ApiError {
    fn from(err: roxmltree::Error) -> Self {
        ApiError::Xml(err.to_string())
    }
}
