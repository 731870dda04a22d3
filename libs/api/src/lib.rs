//! # fwsync-api
//!
//! Device API surface for the fwsync automation libraries.
//!
//! This crate owns everything that touches the device directly:
//!
//! - [`DeviceClient`]: the trait the reconciliation and commit cores consume.
//!   Object CRUD goes through the device's REST API; operational commands,
//!   commits, and key generation go through its XML API.
//! - [`HttpDeviceClient`]: the reqwest-backed implementation.
//! - [`ResponseDocument`]: XML API responses, kept in both raw and
//!   structured form.
//! - [`JobPoller`] / [`IntervalJobPoller`]: waiting on asynchronous device
//!   jobs until they reach a terminal status.
//! - [`TaskReport`] / [`Diff`]: the caller-facing result contract shared by
//!   the reconcile and commit crates.
//!
//! ## Design Principles
//!
//! - Not-found is a value, not an error: `get` returns `(404, None)`.
//! - No process-wide session state; callers hold an explicit client handle.
//! - Transport faults abort the calling flow; nothing here retries writes.

pub mod client;
pub mod config;
pub mod error;
pub mod object;
pub mod op;
pub mod poller;
pub mod report;
pub mod testing;
pub mod xml;

pub use client::{DeviceClient, DeviceInfo, HttpDeviceClient};
pub use config::DeviceConfig;
pub use error::ApiError;
pub use object::{Container, ObjectIdentity};
pub use op::{latest_job_of_type, run_op, show_job, JobInfo, JobReport, OpReport};
pub use poller::{IntervalJobPoller, JobPoller};
pub use report::{Diff, TaskReport};
pub use xml::{command_to_xml, ResponseDocument};

/// Returns true for status codes the device API treats as success.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Status code the device API uses for objects that do not exist.
pub const NOT_FOUND: u16 = 404;
