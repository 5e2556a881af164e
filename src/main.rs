//! Rewrite proxy
//!
//! Forwards `/api/*` requests to a backend origin chosen once at startup.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request ──▶ http server ──▶ routing::RewriteResolver
//!                                            │
//!                          ┌─────────────────┼──────────────────┐
//!                          ▼                 ▼                  ▼
//!                      Rewrite          NoMatch +           NoMatch
//!                  (backend origin)   passthrough origin      (404)
//!                          │                 │
//!                          └──── forward ────┘
//!                                  │
//!     Client Response ◀────────────┘
//! ```

use std::error::Error;
use std::sync::Arc;

use clap::Parser;

use rewrite_proxy::cli::{render_check, render_resolution, Cli, Command};
use rewrite_proxy::lifecycle::{signals, startup, Shutdown};
use rewrite_proxy::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = startup::load(cli.config.as_deref())?;
    init_logging(&config.observability.log_level);

    tracing::info!("rewrite-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command() {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.listener.bind_address = bind;
            }
            let prepared = startup::prepare(config, |key| std::env::var(key).ok())?;

            let shutdown = Arc::new(Shutdown::new());
            signals::spawn_signal_handler(shutdown.clone());

            startup::serve(prepared, shutdown.subscribe()).await?;
            tracing::info!("Shutdown complete");
        }
        Command::Check => {
            let prepared = startup::prepare(config, |key| std::env::var(key).ok())?;
            print!("{}", render_check(&prepared.config, &prepared.resolver));
        }
        Command::Resolve { path, json } => {
            let prepared = startup::prepare(config, |key| std::env::var(key).ok())?;
            let resolution = prepared.resolver.resolve(&path);
            println!("{}", render_resolution(&resolution, json)?);
        }
    }

    Ok(())
}
