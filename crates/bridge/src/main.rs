use anyhow::Context;
use bridge_core::BridgeConfig;
use bridge_host::{HostServer, telemetry};
use clap::Parser;
use netlify_bridge::functions;
use tokio::signal;

#[derive(Debug, Parser)]
#[command(name = "bridge-host")]
struct Cli {
    /// Port to serve the HTTP server on (defaults to BRIDGE_PORT or 8888)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    telemetry::init("info");
    if let Err(err) = run().await {
        tracing::error!(error = %err, "bridge host failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BridgeConfig::from_env()
        .context("failed to load bridge configuration")?
        .with_port(cli.port);

    tracing::info!(
        port = config.port,
        functions_dir = %config.functions_dir.display(),
        "loaded bridge configuration"
    );

    let server = HostServer::new(config.port, functions::builtin_registry());

    tokio::select! {
        result = server.serve() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    Ok(())
}
