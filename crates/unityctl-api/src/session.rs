// Unity management session
//
// Wraps `reqwest::Client` with the array's login handshake, CSRF token
// retention, and the authenticated flag. Every call after login goes
// through `Session::request`, which refuses to run on an unauthenticated
// session and never logs in on the caller's behalf.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::request::{ApiRequest, RawResponse};
use crate::transport::TransportConfig;

/// Prefix under which the array serves its REST API.
const API_PREFIX: &str = "/api";
const LOGIN_PATH: &str = "/types/loginSessionInfo";
const LOGOUT_PATH: &str = "/types/loginSessionInfo/action/logout";
/// Issued on login, required on every POST/DELETE.
const CSRF_HEADER: &str = "EMC-CSRF-TOKEN";

/// One authenticated connection context to a single Unity array.
///
/// Methods that talk to the array take `&mut self`: a session serves one
/// operation at a time, and the borrow checker enforces it.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    csrf_token: Option<String>,
    authenticated: bool,
    cancel: CancellationToken,
}

impl Session {
    /// Create an unauthenticated session from a `TransportConfig`.
    ///
    /// `base_url` is the array root (e.g. `https://unity01.example.com/`);
    /// see [`Session::endpoint_url`] for turning a bare hostname into one.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            csrf_token: None,
            authenticated: false,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a session around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
            csrf_token: None,
            authenticated: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a session and log in: the one-call form used by the CLI.
    pub async fn connect(
        base_url: Url,
        transport: &TransportConfig,
        username: &str,
        password: &SecretString,
    ) -> Result<Self, Error> {
        let mut session = Self::new(base_url, transport)?;
        session.open(username, password).await?;
        Ok(session)
    }

    /// Turn an operator-supplied host into the array root URL.
    ///
    /// Bare hostnames get `https://`; anything with a scheme is taken as is.
    pub fn endpoint_url(host: &str) -> Result<Url, Error> {
        let host = host.trim().trim_end_matches('/');
        if host.contains("://") {
            Ok(Url::parse(&format!("{host}/"))?)
        } else {
            Ok(Url::parse(&format!("https://{host}/"))?)
        }
    }

    /// The array root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Pure query of session state; never touches the network.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Token that aborts the in-flight request when cancelled.
    ///
    /// The CLI trips it from its Ctrl-C handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ── Login / logout ───────────────────────────────────────────────

    /// Perform the login handshake.
    ///
    /// `GET /api/types/loginSessionInfo` with HTTP Basic credentials. The
    /// array answers with a session cookie (kept in the client's jar) and
    /// an `EMC-CSRF-TOKEN` header that must accompany mutating calls.
    /// Any failure, including an unreachable host, is an
    /// [`Error::Authentication`].
    pub async fn open(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        self.authenticated = false;
        let url = self.api_url(LOGIN_PATH)?;
        let endpoint = self.endpoint();
        debug!(%endpoint, username, "logging in");

        let builder = self
            .http
            .get(url)
            .basic_auth(username, Some(password.expose_secret()));

        let (status, headers, body) = match self.exchange(builder, &Method::GET, LOGIN_PATH).await
        {
            Ok(parts) => parts,
            Err(err @ Error::Cancelled { .. }) => return Err(err),
            Err(err) => {
                return Err(Error::Authentication {
                    endpoint,
                    message: err.to_string(),
                    status: None,
                });
            }
        };

        if !status.is_success() {
            return Err(Error::Authentication {
                endpoint,
                message: format!(
                    "login rejected (HTTP {status}): {}",
                    crate::error::preview(&body)
                ),
                status: Some(status.as_u16()),
            });
        }

        self.update_csrf(&headers);
        if self.csrf_token.is_none() {
            warn!(%endpoint, "login response carried no CSRF token; mutating calls may be refused");
        }
        self.authenticated = true;
        debug!("login successful");
        Ok(())
    }

    /// End the session on the array and mark it unauthenticated.
    ///
    /// Closing an unauthenticated session is a no-op.
    pub async fn close(&mut self) -> Result<(), Error> {
        if !self.authenticated {
            return Ok(());
        }
        debug!("logging out");
        let req = ApiRequest::post(LOGOUT_PATH, &json!({ "localCleanupOnly": true }))?;
        let result = self.request(&req).await.map(|_| ());
        self.authenticated = false;
        self.csrf_token = None;
        result
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Issue an authenticated call.
    ///
    /// Non-2xx responses become [`Error::Request`] carrying status and body.
    /// A 401 additionally drops the authenticated flag: the array has
    /// rejected the credential and the session cannot be trusted further.
    /// Nothing is retried.
    pub async fn request(&mut self, req: &ApiRequest) -> Result<RawResponse, Error> {
        let method = req.method().clone();
        if !self.authenticated {
            return Err(Error::NotAuthenticated {
                method: method.to_string(),
                path: req.path().to_owned(),
            });
        }

        let url = self.api_url(req.path())?;
        debug!("{req}");
        trace!(query = ?req.query_pairs(), "request parameters");

        let mut builder = self.http.request(method.clone(), url);
        if !req.query_pairs().is_empty() {
            builder = builder.query(req.query_pairs());
        }
        if let Some(body) = req.body() {
            builder = builder.json(body);
        }
        if req.is_mutating() {
            if let Some(token) = self.csrf_token.as_deref() {
                builder = builder.header(CSRF_HEADER, token);
            }
        }

        let (status, headers, text) = self.exchange(builder, &method, req.path()).await?;
        self.update_csrf(&headers);

        if status == StatusCode::UNAUTHORIZED {
            warn!("{req} rejected with HTTP 401; session is no longer authenticated");
            self.authenticated = false;
        }

        if !status.is_success() {
            return Err(Error::Request {
                method: method.to_string(),
                path: req.path().to_owned(),
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: format!(
                    "{req}: {e} (body preview: {:?})",
                    crate::error::preview(&text)
                ),
                body: text.clone(),
            })?
        };

        trace!(status = status.as_u16(), "{req} completed");
        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Send a request and read its body, racing the cancellation token.
    async fn exchange(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<(StatusCode, HeaderMap, String), Error> {
        let round_trip = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let text = resp.text().await?;
            Ok::<_, reqwest::Error>((status, headers, text))
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled {
                method: method.to_string(),
                path: path.to_owned(),
            }),
            result = round_trip => result.map_err(|source| {
                if source.is_timeout() {
                    Error::Timeout {
                        method: method.to_string(),
                        path: path.to_owned(),
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    Error::Transport {
                        method: method.to_string(),
                        path: path.to_owned(),
                        source,
                    }
                }
            }),
        }
    }

    /// Build `{base}/api{path}`.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}{API_PREFIX}/{path}"))?)
    }

    /// Host (and port, if any) for messages.
    fn endpoint(&self) -> String {
        let host = self.base_url.host_str().unwrap_or("<unknown>");
        match self.base_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        }
    }

    /// Keep the newest CSRF token the array hands out.
    fn update_csrf(&mut self, headers: &HeaderMap) {
        if let Some(token) = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok()) {
            trace!("CSRF token updated");
            self.csrf_token = Some(token.to_owned());
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.authenticated)
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
