//! CLI error types with miette diagnostics.
//!
//! Maps session, core, and config errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use unityctl_config::ConfigError;
use unityctl_core::{CoreError, WorkflowError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the array: {message}")]
    #[diagnostic(
        code(unityctl::connection_failed),
        help(
            "Check that the management address is reachable.\n\
             If the array uses a self-signed certificate, try --insecure (-k)."
        )
    )]
    ConnectionFailed { message: String },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(unityctl::tls_error),
        help("Check the ca_cert path in your profile, or use --insecure (-k).")
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login to {endpoint} failed: {message}")]
    #[diagnostic(
        code(unityctl::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             Store a new password with: unityctl --profile {profile} config set-password\n\
             Self-signed array certificate? Add --insecure (-k)."
        )
    )]
    AuthFailed {
        endpoint: String,
        message: String,
        profile: String,
    },

    #[error("No password available for profile '{profile}'")]
    #[diagnostic(
        code(unityctl::no_credentials),
        help(
            "Pass -p to be prompted, set UNITY_PASSWORD, or store one with:\n\
             unityctl --profile {profile} config set-password"
        )
    )]
    NoCredentials { profile: String },

    #[error("No username configured for profile '{profile}'")]
    #[diagnostic(
        code(unityctl::no_username),
        help("Pass --user (-u), set UNITY_USERNAME, or run: unityctl config init")
    )]
    NoUsername { profile: String },

    #[error("Session is not authenticated ({detail})")]
    #[diagnostic(
        code(unityctl::not_authenticated),
        help("The array rejected the session. Run the command again to log in anew.")
    )]
    NotAuthenticated { detail: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(unityctl::not_found),
        help("Run: unityctl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Array ────────────────────────────────────────────────────────
    #[error("{method} {path} failed with HTTP {status}: {message}")]
    #[diagnostic(code(unityctl::api_error))]
    ApiError {
        method: String,
        path: String,
        status: u16,
        message: String,
    },

    #[error("{operation} failed at {step}")]
    #[diagnostic(
        code(unityctl::workflow_failed),
        help("The array may have applied part of the change; check with `unityctl luns`.")
    )]
    WorkflowFailed {
        operation: String,
        step: String,
        exit: i32,
        #[source]
        source: Box<CliError>,
    },

    #[error("Unexpected data from the array: {message}")]
    #[diagnostic(code(unityctl::unexpected_data))]
    UnexpectedData { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unityctl::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(unityctl::usage))]
    Args(#[from] clap::Error),

    // ── Configuration ────────────────────────────────────────────────
    #[error("No array host configured for profile '{profile}'")]
    #[diagnostic(
        code(unityctl::no_host),
        help(
            "Pass --host (-e), set UNITY_HOST, or create a profile with: unityctl config init\n\
             Config file: {path}"
        )
    )]
    NoHost { profile: String, path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(unityctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: unityctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(unityctl::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(unityctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Interrupted")]
    #[diagnostic(code(unityctl::interrupted))]
    Interrupted,

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("{request} timed out after {seconds}s")]
    #[diagnostic(
        code(unityctl::timeout),
        help("Increase timeout with --timeout or check array responsiveness.")
    )]
    Timeout { request: String, seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(unityctl::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::NoUsername { .. }
            | Self::NotAuthenticated { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError { status, .. } => status_exit_code(*status),
            Self::WorkflowFailed { exit, .. } => *exit,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::Validation { .. }
            | Self::Args(_)
            | Self::NoHost { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the profile in a login failure's help text.
    pub fn with_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed {
                endpoint, message, ..
            } => Self::AuthFailed {
                endpoint,
                message,
                profile: name.to_owned(),
            },
            other => other,
        }
    }
}

fn status_exit_code(status: u16) -> i32 {
    match status {
        401 => exit_code::AUTH,
        403 => exit_code::PERMISSION,
        404 => exit_code::NOT_FOUND,
        409 | 422 => exit_code::CONFLICT,
        _ => exit_code::GENERAL,
    }
}

/// Pull the human-readable message out of an array error body.
///
/// The array answers failures with
/// `{"error": {"messages": [{"en-US": "..."}], ...}}`; anything else is
/// shown as a truncated preview.
fn array_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.pointer("/error/messages/0/en-US")
            .and_then(serde_json::Value::as_str)
    });
    match message {
        Some(m) => m.to_owned(),
        None if body.trim().is_empty() => "(empty response)".into(),
        None => body.chars().take(200).collect(),
    }
}

// ── Session error → CliError mapping ─────────────────────────────────

impl From<unityctl_api::Error> for CliError {
    fn from(err: unityctl_api::Error) -> Self {
        use unityctl_api::Error as E;
        match err {
            E::Authentication {
                endpoint, message, ..
            } => CliError::AuthFailed {
                endpoint,
                message,
                profile: "current".into(),
            },
            E::NotAuthenticated { method, path } => CliError::NotAuthenticated {
                detail: format!("{method} {path} refused locally"),
            },
            E::Transport { method, path, source } => CliError::ConnectionFailed {
                message: format!("{method} {path}: {source}"),
            },
            E::Timeout {
                method,
                path,
                timeout_secs,
            } => CliError::Timeout {
                request: format!("{method} {path}"),
                seconds: timeout_secs,
            },
            E::Cancelled { .. } => CliError::Interrupted,
            E::InvalidUrl(e) => CliError::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            E::Tls(message) => CliError::TlsError { message },
            E::Request {
                method,
                path,
                status,
                body,
            } => CliError::ApiError {
                method,
                path,
                status,
                message: array_message(&body),
            },
            E::Deserialization { message, .. } => CliError::UnexpectedData { message },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),
            CoreError::Workflow(w) => w.into(),
            other => CliError::UnexpectedData {
                message: other.to_string(),
            },
        }
    }
}

impl From<WorkflowError> for CliError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidRequest { operation, reason } => CliError::Validation {
                field: operation,
                reason,
            },
            WorkflowError::Step {
                operation,
                step,
                source,
            } => {
                let cause = CliError::from(source);
                if matches!(cause, CliError::Interrupted) {
                    return cause;
                }
                CliError::WorkflowFailed {
                    operation,
                    step: step.to_string(),
                    exit: cause.exit_code(),
                    source: Box::new(cause),
                }
            }
            WorkflowError::UnexpectedResponse {
                operation, detail, ..
            } => CliError::UnexpectedData {
                message: format!("{operation}: {detail}"),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::NoUsername { profile } => CliError::NoUsername { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use unityctl_core::WorkflowStep;

    use super::*;

    fn request_error(status: u16, body: &str) -> unityctl_api::Error {
        unityctl_api::Error::Request {
            method: "POST".into(),
            path: "/types/storageResource/action/createLun".into(),
            status,
            body: body.into(),
        }
    }

    #[test]
    fn array_error_message_is_extracted() {
        let err = CliError::from(request_error(
            422,
            r#"{"error":{"errorCode":108007744,"messages":[{"en-US":"The name is already in use."}]}}"#,
        ));
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert!(err.to_string().contains("The name is already in use."));
    }

    #[test]
    fn timeout_names_the_request() {
        let err = CliError::from(unityctl_api::Error::Timeout {
            method: "GET".into(),
            path: "/types/lun/instances/sv_16".into(),
            timeout_secs: 30,
        });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            err.to_string(),
            "GET /types/lun/instances/sv_16 timed out after 30s"
        );
    }

    #[test]
    fn cancelled_maps_to_interrupt_code() {
        let err = CliError::from(unityctl_api::Error::Cancelled {
            method: "GET".into(),
            path: "/types/lun/instances".into(),
        });
        assert_eq!(err.exit_code(), 130);
    }

    #[test]
    fn workflow_failure_keeps_cause_exit_code() {
        let err = CliError::from(WorkflowError::Step {
            operation: "delete LUN 'sv_1'".into(),
            step: WorkflowStep::Delete,
            source: request_error(403, ""),
        });
        assert_eq!(err.exit_code(), exit_code::PERMISSION);
        assert!(err.to_string().contains("failed at deletion"));
    }

    #[test]
    fn interrupted_workflow_is_plain_interrupt() {
        let err = CliError::from(WorkflowError::Step {
            operation: "create LUN 'x'".into(),
            step: WorkflowStep::Submit,
            source: unityctl_api::Error::Cancelled {
                method: "POST".into(),
                path: "/x".into(),
            },
        });
        assert!(matches!(err, CliError::Interrupted));
    }

    #[test]
    fn unauthorized_request_is_auth_exit() {
        assert_eq!(
            CliError::from(request_error(401, "")).exit_code(),
            exit_code::AUTH
        );
    }

    #[test]
    fn missing_password_is_auth_exit() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "lab".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn login_failure_names_the_profile() {
        let err = CliError::from(unityctl_api::Error::Authentication {
            endpoint: "https://unity01/api".into(),
            message: "login rejected (HTTP 401)".into(),
            status: Some(401),
        })
        .with_profile("lab");
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "lab"));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
