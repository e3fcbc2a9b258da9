use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    config::LlamaServerConfig,
    error::{ClientError, Result},
    middleware::{self, Middleware},
    transport,
    types::{
        CompletionRequest, CompletionResponse, DetokenizeRequest, DetokenizeResponse,
        EmbeddingRequest, EmbeddingResponse, PropsResponse, TokenizeRequest, TokenizeResponse,
    },
};

pub const PROPS_PATH: &str = "props";
pub const COMPLETION_PATH: &str = "completion";
pub const EMBEDDING_PATH: &str = "embedding";
pub const TOKENIZE_PATH: &str = "tokenize";
pub const DETOKENIZE_PATH: &str = "detokenize";

/// Typed handle on a llama.cpp server.
///
/// Holds the base URL, a configured [`reqwest::Client`] and the middleware list, none
/// of which change after construction. Cloning is cheap and clones share the
/// connection pool, so one client can serve any number of concurrent callers.
///
/// Every call takes a [`CancellationToken`]; cancelling it aborts the in-flight
/// request with [`ClientError::Cancelled`].
#[derive(Debug, Clone)]
pub struct LlamaServerClient {
    base_url: Url,
    http_client: reqwest::Client,
    middleware: Arc<[Arc<dyn Middleware>]>,
}

impl LlamaServerClient {
    /// A zero `timeout` disables the per-request deadline.
    pub fn new<M>(base_url: &str, timeout: Duration, middleware: M) -> Result<Self>
    where
        M: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let timeout = (!timeout.is_zero()).then_some(timeout);
        Self::build(base_url, timeout, middleware.into_iter().collect())
    }

    /// Builds a client from [`LlamaServerConfig`]. When the config carries an API key,
    /// a bearer `Authorization` middleware runs ahead of `extra`.
    pub fn from_config<M>(config: &LlamaServerConfig, extra: M) -> Result<Self>
    where
        M: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let chain: Vec<Arc<dyn Middleware>> = config
            .api_key
            .as_ref()
            .map(middleware::with_bearer_token)
            .into_iter()
            .chain(extra)
            .collect();
        Self::build(&config.base_url, config.effective_timeout(), chain)
    }

    fn build(
        base_url: &str,
        timeout: Option<Duration>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!(
                "{base_url} is not an http(s) base URL"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(ClientError::HttpClientBuild)?;

        let client = Self {
            base_url,
            http_client,
            middleware: middleware.into(),
        };
        tracing::trace!("Client created: {client:?}");
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Joins `segment` onto the base URL's path with exactly one `/`, keeping any
    /// prefix the base path already has.
    pub fn endpoint_url(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            segment.trim_start_matches('/')
        );
        url.set_path(&path);
        url
    }

    /// `GET /props`. A server that answers 404 yields `Ok(None)`.
    pub async fn props(&self, cancel: &CancellationToken) -> Result<Option<PropsResponse>> {
        transport::get(
            &self.http_client,
            &self.middleware,
            self.endpoint_url(PROPS_PATH),
            cancel,
        )
        .await
    }

    /// `POST /completion`.
    pub async fn completion(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionResponse> {
        self.post(COMPLETION_PATH, request, cancel).await
    }

    /// `POST /embedding`.
    pub async fn embedding(
        &self,
        request: &EmbeddingRequest,
        cancel: &CancellationToken,
    ) -> Result<EmbeddingResponse> {
        self.post(EMBEDDING_PATH, request, cancel).await
    }

    /// `POST /tokenize`.
    pub async fn tokenize(
        &self,
        request: &TokenizeRequest,
        cancel: &CancellationToken,
    ) -> Result<TokenizeResponse> {
        self.post(TOKENIZE_PATH, request, cancel).await
    }

    /// `POST /detokenize`.
    pub async fn detokenize(
        &self,
        request: &DetokenizeRequest,
        cancel: &CancellationToken,
    ) -> Result<DetokenizeResponse> {
        self.post(DETOKENIZE_PATH, request, cancel).await
    }

    async fn post<I, O>(&self, segment: &str, request: &I, cancel: &CancellationToken) -> Result<O>
    where
        I: serde::Serialize,
        O: serde::de::DeserializeOwned,
    {
        transport::post(
            &self.http_client,
            &self.middleware,
            self.endpoint_url(segment),
            request,
            cancel,
        )
        .await
    }
}
