#![forbid(unsafe_code)]

//! `simple-mcp-server`: MCP tool server binary.
//!
//! Loads configuration, builds the tool registry, and serves sessions over
//! HTTP/SSE (default) or stdio (`--transport stdio`).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use simple_mcp_server::config::GlobalConfig;
use simple_mcp_server::mcp::handler::AppState;
use simple_mcp_server::mcp::{sse, transport};
use simple_mcp_server::mode::TransportMode;
use simple_mcp_server::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "simple-mcp-server", about = "Minimal MCP tool server", version, long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json). Logs are written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Transport to serve sessions over.
    #[arg(long, value_enum, default_value_t = TransportMode::Sse)]
    transport: TransportMode,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!(transport = args.transport.as_str(), "simple-mcp-server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let config = GlobalConfig::load(args.config.as_deref())?;
    info!(
        server_name = %config.server_name,
        auth = config.auth_enabled(),
        "configuration loaded"
    );

    // ── Build shared application state ──────────────────
    let state = Arc::new(AppState::with_builtin_tools(config)?);
    info!(tools = ?state.registry.tool_names(), "tool registry ready");

    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    // ── Serve ───────────────────────────────────────────
    let outcome = match args.transport {
        TransportMode::Stdio => transport::serve_stdio(Arc::clone(&state), ct.clone()).await,
        TransportMode::Sse => sse::serve_sse(Arc::clone(&state), ct.clone()).await,
    };
    ct.cancel();

    if let Err(ref err) = outcome {
        error!(%err, transport = args.transport.as_str(), "transport failed");
    }
    info!("simple-mcp-server shut down");
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
