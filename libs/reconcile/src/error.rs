//! Error types for reconciliation.

use fwsync_api::ApiError;
use thiserror::Error;

/// The write a failed operation was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetching,
    Listing,
    Creating,
    Editing,
    Deleting,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            Action::Fetching => "fetching",
            Action::Listing => "listing",
            Action::Creating => "creating",
            Action::Editing => "editing",
            Action::Deleting => "deleting",
        };
        write!(f, "{verb}")
    }
}

/// Errors raised while reconciling an object.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Caller-contract violation, detected before any device call.
    #[error("must specify '{0}' if 'state' is 'present'")]
    Validation(&'static str),

    /// The device rejected an operation.
    #[error("Error {action} object '{name}' (status {status})")]
    Operation {
        action: Action,
        name: String,
        status: u16,
    },

    /// A response was parsed but did not have the expected shape.
    #[error("unexpected device response: {0}")]
    Malformed(String),

    /// Transport failure. Fatal; no device state may be assumed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_message_names_the_action() {
        let err = ReconcileError::Operation {
            action: Action::Creating,
            name: "Test-Group".to_string(),
            status: 400,
        };
        assert_eq!(err.to_string(), "Error creating object 'Test-Group' (status 400)");
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = ReconcileError::Validation("members");
        assert!(err.to_string().contains("'members' if 'state' is 'present'"));
    }
}
