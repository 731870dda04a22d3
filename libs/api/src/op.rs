//! Operational command execution and job queries.

use serde_json::Value;

use crate::client::DeviceClient;
use crate::error::ApiError;

/// Command prefixes that never change device state.
const SAFE_CMDS: [&str; 2] = ["diff", "show"];
const SAFE_XML_CMDS: [&str; 2] = ["<diff>", "<show>"];

/// Result of one operational command.
#[derive(Debug, Clone)]
pub struct OpReport {
    /// Whether the command may have changed device state. Read-only
    /// commands (`show`, `diff`) report false.
    pub changed: bool,

    /// Raw XML output.
    pub stdout: String,

    /// Output converted to structured form.
    pub stdout_dict: Value,
}

/// Execute an operational command.
pub async fn run_op<C: DeviceClient + ?Sized>(
    client: &C,
    cmd: &str,
    cmd_is_xml: bool,
) -> Result<OpReport, ApiError> {
    let safe = if cmd_is_xml {
        SAFE_XML_CMDS.iter().any(|prefix| cmd.starts_with(prefix))
    } else {
        SAFE_CMDS.iter().any(|prefix| cmd.starts_with(prefix))
    };

    let doc = client.op(cmd, cmd_is_xml).await?;

    Ok(OpReport {
        changed: !safe,
        stdout: doc.raw().to_string(),
        stdout_dict: doc.value().clone(),
    })
}

/// Info about one device job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobInfo {
    pub id: String,
    pub job_type: String,
    pub status: String,
    pub result: String,
    pub progress: Option<String>,
    pub details: Vec<String>,
}

impl JobInfo {
    /// Build from the structured form of a `<job>` element.
    pub fn from_value(job: &Value) -> Result<Self, ApiError> {
        let text = |key: &str| {
            job.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            id: text("id").ok_or(ApiError::MissingField("job/id"))?,
            job_type: text("type").ok_or(ApiError::MissingField("job/type"))?,
            status: text("status").ok_or(ApiError::MissingField("job/status"))?,
            result: text("result").ok_or(ApiError::MissingField("job/result"))?,
            progress: text("progress"),
            details: detail_lines(job),
        })
    }
}

/// Detail lines, tolerating the single-line scalar collapse.
fn detail_lines(job: &Value) -> Vec<String> {
    match job.get("details").and_then(|details| details.get("line")) {
        Some(Value::String(line)) => vec![line.clone()],
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// A job query result: the typed job plus the raw query output.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: JobInfo,
    /// Raw XML of the query response.
    pub stdout: String,
}

/// Retrieve the status of a specific job id.
pub async fn show_job<C: DeviceClient + ?Sized>(
    client: &C,
    job_id: u64,
) -> Result<JobReport, ApiError> {
    let cmd = format!("<show><jobs><id>{job_id}</id></jobs></show>");
    let doc = client.op(&cmd, true).await?;

    let job = doc
        .get(&["response", "result", "job"])
        .ok_or(ApiError::MissingField("response/result/job"))?;

    Ok(JobReport {
        job: JobInfo::from_value(job)?,
        stdout: doc.raw().to_string(),
    })
}

/// Retrieve the most recent job of a given type from `show jobs all`.
///
/// Absence of a matching job is an error, not an empty result.
pub async fn latest_job_of_type<C: DeviceClient + ?Sized>(
    client: &C,
    job_type: &str,
) -> Result<JobReport, ApiError> {
    let doc = client.op("show jobs all", false).await?;

    let jobs = match doc.get(&["response", "result", "job"]) {
        Some(Value::Array(jobs)) => jobs.clone(),
        Some(job @ Value::Object(_)) => vec![job.clone()],
        _ => Vec::new(),
    };

    let mut found = None;
    for job in &jobs {
        if job.get("type").and_then(Value::as_str) == Some(job_type) {
            found = Some(JobInfo::from_value(job)?);
        }
    }

    match found {
        Some(job) => Ok(JobReport {
            job,
            stdout: doc.raw().to_string(),
        }),
        None => Err(ApiError::JobNotFound(job_type.to_string())),
    }
}
