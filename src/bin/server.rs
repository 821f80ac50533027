//! rsplink Server Binary
//!
//! Starts a stub debug protocol server for manual poking. Real deployments
//! embed [`RspServer`] and register their own command handlers.

use std::sync::Arc;

use clap::Parser;
use rsplink::{Config, RspServer};
use tracing_subscriber::{fmt, EnvFilter};

/// rsplink Server
#[derive(Parser, Debug)]
#[command(name = "rsplink-server")]
#[command(about = "Remote debug protocol server")]
#[command(version)]
struct Args {
    /// Listen port (0 = platform-assigned)
    #[arg(short, long, default_value = "5555")]
    port: u16,

    /// Log every packet and ack byte on the wire
    #[arg(short, long)]
    echo: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rsplink=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("rsplink Server v{}", rsplink::VERSION);

    // Build config from args
    let config = Config::builder().port(args.port).echo(args.echo).build();

    let server = match RspServer::new(config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to bind server: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on port {}", server.port());

    // A trivial handler so the stub answers something; everything else
    // gets the empty "not supported" response.
    server.register_handler("ping", |_cmd| Ok("pong".to_string()));

    // Shut down cleanly on Ctrl+C
    let shutdown_server = Arc::clone(&server);
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, shutting down...");
        shutdown_server.shutdown();
    }) {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::process::exit(1);
    }

    server.run();

    tracing::info!("Server stopped");
}
