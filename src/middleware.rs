//! Request/response interception.
//!
//! Every call made by [`crate::LlamaServerClient`] runs its middleware list twice:
//! once over the outgoing [`reqwest::Request`] before it is sent, and once over the
//! incoming [`reqwest::Response`] before its status is interpreted. Both passes walk
//! the list in registration order and stop at the first failure.

use std::{fmt, sync::Arc};

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, Secret};

/// Error type middleware return to abort a call.
pub type MiddlewareError = Box<dyn std::error::Error + Send + Sync>;

/// Which half of the pipeline a middleware failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewarePhase {
    Request,
    Response,
}

impl fmt::Display for MiddlewarePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewarePhase::Request => write!(f, "request"),
            MiddlewarePhase::Response => write!(f, "response"),
        }
    }
}

/// A pluggable interceptor for outgoing requests and incoming responses.
///
/// Implementors must not assume they are the only middleware installed, and must
/// be safe to share between concurrent calls.
pub trait Middleware: fmt::Debug + Send + Sync {
    fn on_request(&self, request: &mut reqwest::Request) -> Result<(), MiddlewareError>;

    fn on_response(&self, _response: &mut reqwest::Response) -> Result<(), MiddlewareError> {
        Ok(())
    }
}

/// Sets a fixed header on every outgoing request, replacing any existing value.
#[derive(Clone)]
pub struct RequestHeader {
    key: String,
    value: Secret<String>,
    sensitive: bool,
}

impl RequestHeader {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: Secret::new(value.into()),
            sensitive: false,
        }
    }

    /// Marks the header value as sensitive so it is redacted from `Debug` output
    /// of the request's header map.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for RequestHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.sensitive {
            "[REDACTED]"
        } else {
            self.value.expose_secret().as_str()
        };
        f.debug_struct("RequestHeader")
            .field("key", &self.key)
            .field("value", &value)
            .finish()
    }
}

impl Middleware for RequestHeader {
    fn on_request(&self, request: &mut reqwest::Request) -> Result<(), MiddlewareError> {
        let name = HeaderName::from_bytes(self.key.as_bytes())?;
        let mut value = HeaderValue::from_str(self.value.expose_secret())?;
        value.set_sensitive(self.sensitive);
        request.headers_mut().insert(name, value);
        Ok(())
    }
}

/// Logs each outgoing request and the status of each incoming response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracing;

impl Middleware for Tracing {
    fn on_request(&self, request: &mut reqwest::Request) -> Result<(), MiddlewareError> {
        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
        Ok(())
    }

    fn on_response(&self, response: &mut reqwest::Response) -> Result<(), MiddlewareError> {
        tracing::debug!(status = %response.status(), url = %response.url(), "received response");
        Ok(())
    }
}

pub fn with_request_header<K: Into<String>, V: Into<String>>(
    key: K,
    value: V,
) -> Arc<dyn Middleware> {
    Arc::new(RequestHeader::new(key, value))
}

/// Sets the `Authorization` header to `authorization` verbatim.
pub fn with_authorization<V: Into<String>>(authorization: V) -> Arc<dyn Middleware> {
    Arc::new(RequestHeader::new(AUTHORIZATION.as_str(), authorization).sensitive())
}

/// Sets `Authorization: Bearer <token>`.
pub fn with_bearer_token(token: &Secret<String>) -> Arc<dyn Middleware> {
    with_authorization(format!("Bearer {}", token.expose_secret()))
}

pub fn with_content_type<V: Into<String>>(content_type: V) -> Arc<dyn Middleware> {
    with_request_header(CONTENT_TYPE.as_str(), content_type)
}
