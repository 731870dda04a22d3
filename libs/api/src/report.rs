//! Caller-facing result contract.
//!
//! Every top-level operation, reconciliation or commit, reports back in the
//! same shape: whether anything changed, an error message on failure, a
//! before/after diff for object changes, and the structured plus raw forms
//! of a commit job result.

use serde::Serialize;
use serde_json::Value;

/// Before/after snapshot of an object change.
///
/// Purely a reporting artifact; it never feeds back into control flow.
/// An empty side is the empty string, so callers can always render both
/// sides as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diff {
    pub before: Value,
    pub after: Value,
}

impl Diff {
    /// Diff with both sides set.
    pub fn new(before: Value, after: Value) -> Self {
        Self { before, after }
    }

    /// Diff with neither side set.
    pub fn empty() -> Self {
        Self {
            before: Self::empty_side(),
            after: Self::empty_side(),
        }
    }

    /// The sentinel for an absent side.
    pub fn empty_side() -> Value {
        Value::String(String::new())
    }
}

/// Result of one reconciliation or commit invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskReport {
    /// Whether the device configuration was (or, in check mode, would be)
    /// changed.
    pub changed: bool,

    /// Human-readable message; always present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    /// Object diff, for reconciliation flows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,

    /// Job result document rendered as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    /// Job result document in raw XML form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_xml: Option<String>,
}

impl TaskReport {
    /// Report for an invocation that changed nothing.
    pub fn unchanged(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }

    /// Report for a failed invocation.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }
}
