use thiserror::Error;

/// Top-level error type for the `unityctl-api` crate.
///
/// Covers every failure mode of a Unity management session: login,
/// transport, non-2xx responses, and local session state.
/// `unityctl-core` passes these through unchanged and only adds
/// workflow context on top.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed: bad credentials, unreachable array, or TLS failure
    /// during the handshake.
    #[error("Authentication against {endpoint} failed: {message}")]
    Authentication {
        endpoint: String,
        message: String,
        status: Option<u16>,
    },

    /// A request was attempted on a session that has not logged in
    /// (or whose credential was rejected by the array).
    #[error("{method} {path} refused: session is not authenticated")]
    NotAuthenticated { method: String, path: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Network failure mid-request (connection reset, DNS failure, ...).
    #[error("{method} {path} failed in transport: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("{method} {path} timed out after {timeout_secs}s")]
    Timeout {
        method: String,
        path: String,
        timeout_secs: u64,
    },

    /// The request was aborted by the session's cancellation token.
    #[error("{method} {path} cancelled before the array responded")]
    Cancelled { method: String, path: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Array responses ─────────────────────────────────────────────
    /// Non-2xx response from an authenticated call.
    #[error("{method} {path} returned HTTP {status}: {}", preview(.body))]
    Request {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Authentication { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if the array reported the addressed object as absent.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the array rejected the session credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotAuthenticated { .. }) || self.status() == Some(401)
    }

    /// Returns `true` if the request was cut short locally (interrupt).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// First 200 bytes of a response body, on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
