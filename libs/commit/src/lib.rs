//! Commit orchestration.
//!
//! Committing applies the device's pending candidate configuration. The
//! operation is asynchronous on the device side: submitting yields a job
//! id, and the job is polled until it reaches a terminal status.
//!
//! The orchestrator sequences one commit invocation as an explicit state
//! machine:
//!
//! ```text
//! Idle → CheckingPending → Submitting → Polling → Succeeded
//!                        ↘ NoChanges            ↘ Failed
//! ```
//!
//! One orchestrator instance serves exactly one invocation and owns its
//! commit job exclusively; there is no retry, no cancellation, and no
//! timeout beyond what the injected [`JobPoller`](fwsync_api::JobPoller)
//! applies to its own wait loop.

mod error;
mod orchestrator;

pub use error::CommitError;
pub use orchestrator::{CommitOrchestrator, CommitOutcome, CommitState};
