// unityctl-api: Async session client for the EMC Unity REST management API

pub mod error;
pub mod request;
pub mod session;
pub mod transport;

pub use error::Error;
pub use request::{ApiRequest, RawResponse};
pub use reqwest::Method;
pub use session::Session;
pub use transport::{TlsMode, TransportConfig};
