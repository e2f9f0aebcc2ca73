//! Stdio MCP server that exposes the relay as an `ask_gemini` tool.
//!
//! Reads one JSON-RPC message per line from stdin and writes replies to
//! stdout. Logs go to stderr so they never corrupt the protocol stream.

use anyhow::Result;
use clap::Parser;
use gemini_relay::mcp::forwarder::DEFAULT_RELAY_URL;
use gemini_relay::mcp::{HttpForwarder, McpBridge};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mcp_bridge")]
#[command(about = "Expose the Gemini relay as an MCP tool over stdio")]
struct CliArgs {
    /// Relay endpoint to forward tool calls to.
    #[arg(long, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    /// Per-call timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_relay=info,mcp_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let forwarder = HttpForwarder::new(args.relay_url, Duration::from_secs(args.timeout_secs));
    info!("MCP bridge forwarding to {}", forwarder.relay_url());

    let bridge = McpBridge::new(Box::new(forwarder));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(reply) = bridge.handle_line(&line).await {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    info!("stdin closed, exiting");
    Ok(())
}
