//! Casaora agent chat bridge
//!
//! Serves the admin console's streaming chat endpoint and relays each turn
//! to the agent backend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use casaora_bridge::upstream::AgentClient;
use casaora_bridge::{AppState, build_router};
use casaora_core::config::{self, load_config};
use casaora_core::tracing_init::init_tracing;
use casaora_core::ui_stream::FrameEncoder;

#[derive(Parser, Debug)]
#[command(name = "casaora-bridge")]
#[command(version, about = "Casaora agent chat bridge - UI message stream relay")]
struct Args {
    /// Path to a JSON settings file.
    #[arg(long, env = "CASAORA_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides the settings file).
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Agent API base URL, e.g. `http://localhost:8000/v1`.
    #[arg(long)]
    api_base_url: Option<String>,

    /// Log level filter for the bridge (e.g. "info", "debug", "warn").
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "CASAORA_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.listen_addr = addr;
    }
    if let Some(url) = args.api_base_url {
        config.upstream.api_base_url = url;
    }
    if let Some(level) = args.log_level {
        config.server.log_level = level;
    }
    config.server.log_json |= args.log_json;
    config::validate(&config)?;

    init_tracing(&config.server.log_level, config.server.log_json);

    let agent = AgentClient::new(
        &config.upstream.api_base_url,
        Duration::from_secs(config.upstream.connect_timeout_secs),
    )?;

    let state = AppState {
        agent: Arc::new(agent),
        encoder: FrameEncoder::new(config.stream.data_namespace.clone()),
        session_cookie: Arc::from(config.stream.session_cookie.as_str()),
    };

    info!(
        addr = %config.server.listen_addr,
        api_base_url = %config.upstream.api_base_url,
        namespace = %config.stream.data_namespace,
        "starting casaora-bridge"
    );

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr).await?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("casaora-bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
