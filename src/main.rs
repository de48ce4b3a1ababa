use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use minihttp::app;
use minihttp::config::Config;
use minihttp::server;

#[derive(Parser, Debug)]
#[command(version, about = "Minimal HTTP/1.1 server")]
struct Cli {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// YAML config file
    #[arg(long, env = "CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()>{
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        cfg.port = port;
    }

    let router = Arc::new(app::router(&cfg)?);

    tokio::select! {
        res = server::listener::run(&cfg, router) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
