//! Job polling.
//!
//! Commits and other long-running device operations return a job id and
//! complete asynchronously. A [`JobPoller`] blocks until the job reaches a
//! terminal device-side status and returns the full job document. Timeout
//! policy belongs to the poller; callers treat `poll` as a single suspend
//! point.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::client::DeviceClient;
use crate::config::DeviceConfig;
use crate::error::ApiError;
use crate::xml::ResponseDocument;

/// Terminal job status on the device.
const JOB_STATUS_FINISHED: &str = "FIN";

/// Waits for an asynchronous device job to finish.
#[async_trait]
pub trait JobPoller: Send + Sync {
    /// Block until `job_id` reaches a terminal status; returns the job's
    /// final response document.
    async fn poll(&self, job_id: &str) -> Result<ResponseDocument, ApiError>;
}

/// Polls job status through the device client at a fixed interval.
pub struct IntervalJobPoller<'a, C> {
    client: &'a C,
    interval: Duration,
    max_attempts: u32,
}

impl<'a, C: DeviceClient> IntervalJobPoller<'a, C> {
    /// Poller with an explicit interval and attempt budget.
    pub fn new(client: &'a C, interval: Duration, max_attempts: u32) -> Self {
        Self {
            client,
            interval,
            max_attempts,
        }
    }

    /// Poller using the polling settings from `config`.
    pub fn from_config(client: &'a C, config: &DeviceConfig) -> Self {
        Self::new(
            client,
            Duration::from_secs(config.poll_interval_secs),
            config.poll_max_attempts,
        )
    }
}

#[async_trait]
impl<'a, C: DeviceClient> JobPoller for IntervalJobPoller<'a, C> {
    async fn poll(&self, job_id: &str) -> Result<ResponseDocument, ApiError> {
        for attempt in 1..=self.max_attempts {
            let cmd = format!("<show><jobs><id>{job_id}</id></jobs></show>");
            let doc = self.client.op(&cmd, true).await?;

            let status = doc
                .text(&["response", "result", "job", "status"])
                .ok_or(ApiError::MissingField("response/result/job/status"))?;

            if status == JOB_STATUS_FINISHED {
                debug!(job_id, attempt, "job finished");
                return Ok(doc);
            }

            // ACT, PEND, and anything unrecognized: still in flight.
            debug!(job_id, status, attempt, "job still running");
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(ApiError::JobTimeout {
            job_id: job_id.to_string(),
            attempts: self.max_attempts,
        })
    }
}
