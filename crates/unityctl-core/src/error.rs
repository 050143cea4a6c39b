// ── Core error types ──
//
// Transport- and request-level failures from `unityctl-api` pass through
// unchanged (`CoreError::Api`). Workflows add which step failed but keep
// the underlying error as the source.

use strum::Display;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session / array errors (unchanged) ───────────────────────────
    #[error(transparent)]
    Api(#[from] unityctl_api::Error),

    // ── Record errors ────────────────────────────────────────────────
    #[error("{resource_type} '{id}' has no '{field}' field")]
    FieldMissing {
        resource_type: String,
        id: String,
        field: String,
    },

    #[error("{resource_type} '{id}' field '{field}' is malformed: {reason}")]
    InvalidField {
        resource_type: String,
        id: String,
        field: String,
        reason: String,
    },

    #[error("{resource_type} record has no id: {record}")]
    MissingId {
        resource_type: String,
        record: String,
    },

    #[error("Unexpected {resource_type} response from array: {detail}")]
    UnexpectedResponse {
        resource_type: String,
        detail: String,
    },

    // ── Workflow errors ──────────────────────────────────────────────
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl CoreError {
    /// The underlying session error, if this is one.
    pub fn api_error(&self) -> Option<&unityctl_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            Self::Workflow(w) => w.api_error(),
            _ => None,
        }
    }

    /// HTTP status of the underlying failure, if any.
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(unityctl_api::Error::status)
    }

    /// Returns `true` if the failure was a local interrupt.
    pub fn is_cancelled(&self) -> bool {
        self.api_error()
            .is_some_and(unityctl_api::Error::is_cancelled)
    }
}

/// The step of a mutation workflow that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WorkflowStep {
    #[strum(to_string = "submission")]
    Submit,
    #[strum(to_string = "deletion")]
    Delete,
}

/// A multi-step mutation failed. Wraps the causal error with the step.
///
/// The array may have applied part of the change before the failure;
/// nothing here rolls it back.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{operation}: invalid request: {reason}")]
    InvalidRequest { operation: String, reason: String },

    #[error("{operation} failed at {step}: {source}")]
    Step {
        operation: String,
        step: WorkflowStep,
        #[source]
        source: unityctl_api::Error,
    },

    #[error("{operation}: array returned an unexpected response ({detail})")]
    UnexpectedResponse {
        operation: String,
        detail: String,
        body: String,
    },
}

impl WorkflowError {
    pub fn api_error(&self) -> Option<&unityctl_api::Error> {
        match self {
            Self::Step { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(unityctl_api::Error::status)
    }
}

/// The mutation went through but its result could not be confirmed.
///
/// The object exists on the array (the submission succeeded); only the
/// follow-up lookup failed.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("lun '{id}' was created but the follow-up lookup failed: {source}")]
    Lookup {
        id: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("lun '{id}' was created but the array does not list it")]
    Missing { id: String },
}

impl VerificationError {
    /// Id of the object that was created.
    pub fn id(&self) -> &str {
        match self {
            Self::Lookup { id, .. } | Self::Missing { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_error(status: u16) -> unityctl_api::Error {
        unityctl_api::Error::Request {
            method: "POST".into(),
            path: "/types/storageResource/action/createLun".into(),
            status,
            body: "{}".into(),
        }
    }

    #[test]
    fn workflow_step_error_keeps_cause_and_status() {
        let err = WorkflowError::Step {
            operation: "create LUN 'vol1'".into(),
            step: WorkflowStep::Submit,
            source: request_error(409),
        };
        let msg = err.to_string();
        assert!(msg.contains("create LUN 'vol1' failed at submission"));
        assert!(msg.contains("HTTP 409"));
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn core_error_reaches_through_workflow_for_status() {
        let err = CoreError::from(WorkflowError::Step {
            operation: "delete LUN 'sv_1'".into(),
            step: WorkflowStep::Delete,
            source: request_error(500),
        });
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn field_missing_names_type_id_and_field() {
        let err = CoreError::FieldMissing {
            resource_type: "lun".into(),
            id: "sv_1".into(),
            field: "hostAccess".into(),
        };
        assert_eq!(err.to_string(), "lun 'sv_1' has no 'hostAccess' field");
    }

    #[test]
    fn verification_error_exposes_created_id() {
        let err = VerificationError::Missing { id: "sv_5".into() };
        assert_eq!(err.id(), "sv_5");
    }
}
