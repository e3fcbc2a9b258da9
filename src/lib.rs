//! llama_server_client – typed async client for the `llama.cpp` server
//! =====================================================================
//!
//! ### Endpoints ⇄ Typed Helpers
//! | HTTP Route          | Helper on `LlamaServerClient` | Request type          | Response type          |
//! |---------------------|-------------------------------|-----------------------|------------------------|
//! | `GET  /props`       | `props()`                     | –                     | [`PropsResponse`]      |
//! | `POST /completion`  | `completion()`                | [`CompletionRequest`] | [`CompletionResponse`] |
//! | `POST /embedding`   | `embedding()`                 | [`EmbeddingRequest`]  | [`EmbeddingResponse`]  |
//! | `POST /tokenize`    | `tokenize()`                  | [`TokenizeRequest`]   | [`TokenizeResponse`]   |
//! | `POST /detokenize`  | `detokenize()`                | [`DetokenizeRequest`] | [`DetokenizeResponse`] |
//!
//! Cross-cutting concerns (auth headers, logging) plug in as [`Middleware`].
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use llama_server_client::*;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = LlamaServerClient::new(
//!         "http://localhost:8080",
//!         Duration::from_secs(60),
//!         [with_authorization("Bearer abc")],
//!     )?;
//!
//!     let res = client
//!         .embedding(&EmbeddingRequest::new("Hello world!"), &CancellationToken::new())
//!         .await?;
//!     println!("{:?}", res.embedding);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod transport;
pub mod types;

pub use client::LlamaServerClient;
pub use config::LlamaServerConfig;
pub use error::{ClientError, Result};
pub use logging::LoggingConfig;
pub use middleware::{
    with_authorization, with_bearer_token, with_content_type, with_request_header, Middleware,
    MiddlewareError, MiddlewarePhase, RequestHeader, Tracing,
};
pub use types::*;
