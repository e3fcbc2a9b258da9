//! Llama Server CLI
//! ================
//!
//! Calls one endpoint of a running `llama.cpp` server and prints the JSON reply.
//!
//! ```text
//! $ llama_server_cli embed "Hello world!"
//! $ llama_server_cli --url http://10.0.0.2:8080 complete "The capital of France is" --n-predict 16
//! $ LLAMA_SERVER_API_KEY=abc llama_server_cli props
//! ```
//!
//! Flags left unset fall back to `LLAMA_SERVER_URL`, `LLAMA_SERVER_TIMEOUT_SECS`
//! and `LLAMA_SERVER_API_KEY` (a `.env` file is honoured). Ctrl-C cancels the call.

// cargo run --bin llama_server_cli -- tokenize "Hello world!"

use std::{sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use llama_server_client::*;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "llama_server_cli", version)]
struct Cli {
    /// Base URL of the server
    #[arg(long)]
    url: Option<String>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Sent as `Authorization: Bearer <key>`
    #[arg(long)]
    api_key: Option<String>,

    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Show the server's properties
    Props,

    /// Generate a completion for a prompt
    Complete {
        prompt: String,
        #[arg(long)]
        n_predict: Option<i32>,
        #[arg(long)]
        temperature: Option<f64>,
    },

    /// Embed a piece of text
    Embed { content: String },

    /// Turn text into token ids
    Tokenize { content: String },

    /// Turn token ids back into text
    Detokenize {
        #[arg(required = true)]
        tokens: Vec<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = LoggingConfig::new()
        .level(cli.log_level)
        .logger_name("llama_server_cli")
        .init()?;

    let mut config = LlamaServerConfig::from_env()?;
    if let Some(url) = cli.url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(api_key) = cli.api_key {
        config = config.with_api_key(api_key);
    }
    let client = LlamaServerClient::from_config(&config, [Arc::new(Tracing) as Arc<dyn Middleware>])?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let output = match cli.cmd {
        Cmd::Props => match client.props(&cancel).await? {
            Some(props) => serde_json::to_string_pretty(&props)?,
            None => anyhow::bail!("{} has no /props endpoint", client.base_url()),
        },
        Cmd::Complete {
            prompt,
            n_predict,
            temperature,
        } => {
            let request = CompletionRequest::builder()
                .prompt(prompt)
                .settings(
                    CompletionSettings::builder()
                        .maybe_n_predict(n_predict)
                        .maybe_temperature(temperature)
                        .build(),
                )
                .build();
            serde_json::to_string_pretty(&client.completion(&request, &cancel).await?)?
        }
        Cmd::Embed { content } => serde_json::to_string_pretty(
            &client
                .embedding(&EmbeddingRequest::new(content), &cancel)
                .await?,
        )?,
        Cmd::Tokenize { content } => serde_json::to_string_pretty(
            &client
                .tokenize(&TokenizeRequest::new(content), &cancel)
                .await?,
        )?,
        Cmd::Detokenize { tokens } => serde_json::to_string_pretty(
            &client
                .detokenize(&DetokenizeRequest::from(tokens), &cancel)
                .await?,
        )?,
    };
    println!("{output}");
    Ok(())
}
