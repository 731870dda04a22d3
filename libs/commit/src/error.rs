//! Error types for commit orchestration.

use fwsync_api::ApiError;
use thiserror::Error;

/// Errors raised while committing.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The commit was submitted but the response carried no job id, so the
    /// commit could not be scheduled. Fatal; nothing is polled.
    #[error("Could not find commit job.")]
    Scheduling,

    /// The commit job finished with a non-success result. Carries the full
    /// job result in both forms for diagnosis.
    #[error("Commit failed.")]
    JobFailed {
        result: String,
        stdout: String,
        stdout_xml: String,
    },

    /// A response was parsed but did not have the expected shape.
    #[error("unexpected commit response: {0}")]
    Malformed(String),

    /// Transport failure at any state. Aborts the state machine; the
    /// caller cannot assume any state change occurred.
    #[error(transparent)]
    Api(#[from] ApiError),
}
