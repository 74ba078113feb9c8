//! `luma-nodes` -- run one Luma node from a JSON request.
//!
//! Reads a request document from the file given as the first argument, or
//! from stdin, runs the node and prints its output as JSON. Ctrl-C cancels
//! a pending generation wait.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default        | Description                      |
//! |--------------------|----------|----------------|----------------------------------|
//! | `LUMA_CONFIG_FILE` | no       | `config.env`   | Key/value file read before env   |
//! | `LUMAAI_API_KEY`   | for Luma nodes | --       | Dream Machine API key            |
//! | `IMGBB_API_KEY`    | for uploads    | --       | ImgBB API key                    |
//! | `LUMA_OUTPUT_DIR`  | no       | `output`       | Root for saved assets            |
//!
//! See [`luma_nodes::Settings::load`] for the polling and timeout keys.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use luma_nodes::{dispatch, NodeContext, NodeRequest, Settings};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luma_nodes=info,luma_api=info,luma_imgbb=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        match e.downcast_ref::<luma_nodes::NodeError>() {
            Some(node_error) => {
                tracing::error!(code = node_error.code(), error = %node_error, "Node failed");
            }
            None => tracing::error!(error = %format!("{e:#}"), "Node failed"),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let text = read_request(std::env::args_os().nth(1).map(PathBuf::from))?;
    let request = NodeRequest::from_json(&text)?;

    let settings = Settings::load()?;
    tracing::debug!(?settings, "Configuration loaded");

    let cancel = CancellationToken::new();
    let ctx = NodeContext::from_settings(settings, "")?.with_cancel_token(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });

    let output = dispatch(&ctx, request).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_request(path: Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read request file {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read request from stdin")?;
            Ok(text)
        }
    }
}
