//! The commit state machine.

use fwsync_api::{DeviceClient, JobPoller, TaskReport};
use tracing::{debug, info};

use crate::error::CommitError;

/// Job result value the device reports for a successful commit.
const JOB_RESULT_OK: &str = "OK";

/// States of one commit invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Idle,
    CheckingPending,
    Submitting,
    Polling,
    NoChanges,
    Succeeded,
    Failed,
}

/// Terminal result of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The device had no pending changes; no commit was submitted.
    NoChanges,

    /// The commit job finished with the success result.
    Committed {
        /// Job result document rendered as JSON.
        stdout: String,
        /// Job result document in raw XML form.
        stdout_xml: String,
    },
}

impl CommitOutcome {
    /// Render the outcome in the caller contract.
    pub fn into_report(self) -> TaskReport {
        match self {
            CommitOutcome::NoChanges => TaskReport::unchanged("There are no changes to commit."),
            CommitOutcome::Committed { stdout, stdout_xml } => TaskReport {
                changed: true,
                msg: None,
                diff: None,
                stdout: Some(stdout),
                stdout_xml: Some(stdout_xml),
            },
        }
    }
}

impl CommitError {
    /// Render the failure in the caller contract. A failed job carries its
    /// result payloads alongside the message.
    pub fn into_report(self) -> TaskReport {
        match self {
            CommitError::JobFailed {
                stdout, stdout_xml, ..
            } => TaskReport {
                changed: false,
                msg: Some("Commit failed.".to_string()),
                diff: None,
                stdout: Some(stdout),
                stdout_xml: Some(stdout_xml),
            },
            other => TaskReport::failed(other.to_string()),
        }
    }
}

/// Sequences one commit: check for pending changes, submit, poll the job,
/// interpret the terminal result.
///
/// One instance per invocation; [`run`](Self::run) consumes the
/// orchestrator, so the job id it obtains is owned exclusively for the
/// call's duration.
pub struct CommitOrchestrator<'a, C, P> {
    client: &'a C,
    poller: &'a P,
    state: CommitState,
}

impl<'a, C: DeviceClient, P: JobPoller> CommitOrchestrator<'a, C, P> {
    pub fn new(client: &'a C, poller: &'a P) -> Self {
        Self {
            client,
            poller,
            state: CommitState::Idle,
        }
    }

    /// Current state. Terminal states persist after `run` via the value it
    /// returns; this accessor exists for inspection before then.
    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Run the commit to a terminal state.
    ///
    /// `admins`, when given, scopes the commit to changes made by those
    /// administrators; the list is passed through unmodified and in order.
    pub async fn run(mut self, admins: Option<&[String]>) -> Result<CommitOutcome, CommitError> {
        self.state = CommitState::CheckingPending;
        if !self.pending_changes().await? {
            self.state = CommitState::NoChanges;
            info!("no pending changes, commit not submitted");
            return Ok(CommitOutcome::NoChanges);
        }

        self.state = CommitState::Submitting;
        let job_id = self.submit(admins).await?;

        self.state = CommitState::Polling;
        debug!(job_id = %job_id, "waiting for commit job");
        let doc = self.poller.poll(&job_id).await?;

        let result = doc
            .text(&["response", "result", "job", "result"])
            .ok_or_else(|| CommitError::Malformed("job document without result".to_string()))?
            .to_string();

        let stdout = doc.to_json();
        let stdout_xml = doc.raw().to_string();

        if result == JOB_RESULT_OK {
            self.state = CommitState::Succeeded;
            info!(job_id = %job_id, "commit succeeded");
            Ok(CommitOutcome::Committed { stdout, stdout_xml })
        } else {
            self.state = CommitState::Failed;
            Err(CommitError::JobFailed {
                result,
                stdout,
                stdout_xml,
            })
        }
    }

    /// Ask the device whether the candidate configuration has pending
    /// changes.
    async fn pending_changes(&self) -> Result<bool, CommitError> {
        let doc = self.client.op("check pending-changes", false).await?;

        match doc.text(&["response", "result"]) {
            Some("yes") => Ok(true),
            Some("no") => Ok(false),
            _ => Err(CommitError::Malformed(
                "pending-changes response without result".to_string(),
            )),
        }
    }

    /// Submit the commit and return the scheduled job id.
    async fn submit(&self, admins: Option<&[String]>) -> Result<String, CommitError> {
        let doc = self.client.commit(admins).await?;

        doc.text(&["response", "result", "job"])
            .map(str::to_string)
            .ok_or(CommitError::Scheduling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwsync_api::testing::{ScriptedClient, ScriptedPoller, ScriptedResponse};

    #[tokio::test]
    async fn orchestrator_starts_idle() {
        let client = ScriptedClient::new(vec![]);
        let poller = ScriptedPoller::new(vec![]);
        let orchestrator = CommitOrchestrator::new(&client, &poller);
        assert_eq!(orchestrator.state(), CommitState::Idle);
    }

    #[tokio::test]
    async fn malformed_pending_check_is_an_error() {
        let client = ScriptedClient::new(vec![ScriptedResponse::Xml(
            "<response status=\"success\"><wrong/></response>".to_string(),
        )]);
        let poller = ScriptedPoller::new(vec![]);
        let orchestrator = CommitOrchestrator::new(&client, &poller);

        let err = orchestrator.run(None).await.unwrap_err();
        assert!(matches!(err, CommitError::Malformed(_)));
    }
}
