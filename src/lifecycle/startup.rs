//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Resolve the backend origin and compile the rewrite rules
//! - Start metrics, bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::origin::OriginSource;
use crate::config::validation::validate_config;
use crate::config::{load_config, BackendOrigin, ConfigurationError, ProxyConfig};
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::routing::RewriteResolver;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration with its origin resolved and rules compiled.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub config: ProxyConfig,
    pub resolver: RewriteResolver,
}

/// Read the config file, or fall back to built-in defaults.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigurationError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigurationError::Validation)?;
            Ok(config)
        }
    }
}

/// Resolve the backend origin through `lookup` and compile the rules.
///
/// Re-validates `config`, so command-line overrides are checked too.
pub fn prepare<F>(config: ProxyConfig, lookup: F) -> Result<Prepared, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    validate_config(&config).map_err(ConfigurationError::Validation)?;
    let origin = BackendOrigin::resolve(&config.backend, lookup)?;
    let resolver = RewriteResolver::new(&config.rewrites, origin)?;

    let source = match resolver.origin().source() {
        OriginSource::Environment(var) => var.as_str(),
        OriginSource::Fallback => "fallback",
    };
    tracing::info!(
        origin = %resolver.origin(),
        source = source,
        rules = resolver.rules().len(),
        output = %config.output,
        "Rewrite rules compiled"
    );

    Ok(Prepared { config, resolver })
}

/// Run the proxy until `shutdown` fires.
pub async fn serve(
    prepared: Prepared,
    shutdown: watch::Receiver<bool>,
) -> Result<(), StartupError> {
    let Prepared { config, resolver } = prepared;

    if config.observability.metrics_enabled {
        // Validated at load time
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let server = HttpServer::new(config, resolver)?;
    server.run(listener, shutdown).await?;
    Ok(())
}
