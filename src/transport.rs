//! Generic typed call pipeline shared by every endpoint.
//!
//! request middleware -> send -> response middleware -> status -> decode
//!
//! Nothing here retries. The response body is read to the end on every path that
//! gets past the response middleware, and dropped otherwise, so the connection is
//! always released before we return.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    error::{map_deserialization_error, map_serialization_error, ClientError, Result},
    middleware::{Middleware, MiddlewarePhase},
};

/// Make a POST request to `url` with `request` as the JSON body and deserialize the
/// response body.
pub async fn post<I, O>(
    http_client: &reqwest::Client,
    middleware: &[Arc<dyn Middleware>],
    url: Url,
    request: &I,
    cancel: &CancellationToken,
) -> Result<O>
where
    I: Serialize + ?Sized,
    O: DeserializeOwned,
{
    let body = serde_json::to_vec(request).map_err(map_serialization_error)?;
    tracing::trace!("Serialized request: {}", String::from_utf8_lossy(&body));

    let request = http_client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .build()
        .map_err(ClientError::RequestBuild)?;

    let (status, bytes) = execute(http_client, middleware, request, cancel).await?;
    check_status(status, bytes.clone())?;
    decode(&bytes)
}

/// Make a GET request to `url` and deserialize the response body.
///
/// A 404 is not an error here: it yields `Ok(None)`.
pub async fn get<O>(
    http_client: &reqwest::Client,
    middleware: &[Arc<dyn Middleware>],
    url: Url,
    cancel: &CancellationToken,
) -> Result<Option<O>>
where
    O: DeserializeOwned,
{
    let request = http_client
        .get(url)
        .build()
        .map_err(ClientError::RequestBuild)?;

    let (status, bytes) = execute(http_client, middleware, request, cancel).await?;
    if status == StatusCode::NOT_FOUND {
        tracing::debug!("resource not found");
        return Ok(None);
    }
    check_status(status, bytes.clone())?;
    decode(&bytes).map(Some)
}

async fn execute(
    http_client: &reqwest::Client,
    middleware: &[Arc<dyn Middleware>],
    mut request: reqwest::Request,
    cancel: &CancellationToken,
) -> Result<(StatusCode, Bytes)> {
    for m in middleware {
        m.on_request(&mut request)
            .map_err(|source| ClientError::Middleware {
                phase: MiddlewarePhase::Request,
                source,
            })?;
    }
    tracing::debug!(method = %request.method(), url = %request.url(), "calling llama server");

    let round_trip = async {
        let mut response = http_client
            .execute(request)
            .await
            .map_err(ClientError::Reqwest)?;

        for m in middleware {
            m.on_response(&mut response)
                .map_err(|source| ClientError::Middleware {
                    phase: MiddlewarePhase::Response,
                    source,
                })?;
        }

        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::Reqwest)?;
        Ok((status, bytes))
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = round_trip => result,
    }
}

fn check_status(status: StatusCode, body: Bytes) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    tracing::warn!(
        status = status.as_u16(),
        body = %String::from_utf8_lossy(&body),
        "api responded with non-success status"
    );
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}

fn decode<O: DeserializeOwned>(bytes: &[u8]) -> Result<O> {
    tracing::trace!("Serialized response: {}", String::from_utf8_lossy(bytes));
    serde_json::from_slice(bytes).map_err(|e| map_deserialization_error(e, bytes))
}
