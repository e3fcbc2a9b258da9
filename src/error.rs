use crate::middleware::{MiddlewareError, MiddlewarePhase};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL handed to the client could not be parsed
    #[error("could not parse base URL: {0}")]
    UrlParse(#[from] url::ParseError),
    /// The base URL parsed but cannot have endpoint paths joined onto it
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    /// The underlying reqwest client could not be configured
    #[error("failed to build http client: {0}")]
    HttpClientBuild(reqwest::Error),
    /// Error when a request cannot be serialized into JSON
    #[error("failed to marshal request: {0}")]
    JSONSerialize(serde_json::Error),
    /// The http request itself could not be constructed
    #[error("failed to create request: {0}")]
    RequestBuild(reqwest::Error),
    /// A middleware aborted the call
    #[error("middleware failed to modify {phase}: {source}")]
    Middleware {
        phase: MiddlewarePhase,
        #[source]
        source: MiddlewareError,
    },
    /// Underlying error from reqwest library after an API call was made
    #[error("failed to perform HTTP request: {0}")]
    Reqwest(reqwest::Error),
    /// The caller's cancellation token fired before the call completed
    #[error("request cancelled")]
    Cancelled,
    /// The server answered with a status outside 200-299. `body` holds the raw bytes
    /// the server sent
    #[error(
        "api responded with non-success status {status}: message: {}",
        String::from_utf8_lossy(.body)
    )]
    Api { status: u16, body: bytes::Bytes },
    /// Error when a response cannot be deserialized into a Rust type
    #[error("api responded with 2xx status code, but the response could not be decoded: {0}")]
    JSONDeserialize(serde_json::Error),
    /// A configuration value (env var, log directory) was rejected
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Status code of a non-2xx response, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the failure happened before or during the network round trip,
    /// as opposed to the server rejecting the request or replying with an unexpected shape.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Reqwest(_) | ClientError::Cancelled)
    }
}

pub(crate) fn map_deserialization_error(e: serde_json::Error, bytes: &[u8]) -> ClientError {
    tracing::error!(
        "failed deserialization of: {}",
        String::from_utf8_lossy(bytes)
    );
    ClientError::JSONDeserialize(e)
}

pub(crate) fn map_serialization_error(e: serde_json::Error) -> ClientError {
    tracing::error!("failed serialization: {}", e);
    ClientError::JSONSerialize(e)
}
