//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Resolve each request path against the rewrite rules
//! - Forward rewritten requests, pass unmatched ones through or 404
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::forward::{Forwarder, ProxyError};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::observability::metrics::{self, Outcome};
use crate::routing::matcher::has_dot_segment;
use crate::routing::{Resolution, RewriteResolver};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RewriteResolver>,
    pub forwarder: Forwarder,
    /// Normalized origin for unmatched requests.
    pub passthrough: Option<Arc<str>>,
}

/// HTTP server for the rewrite proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration and the
    /// resolver compiled from it.
    pub fn new(config: ProxyConfig, resolver: RewriteResolver) -> Result<Self, reqwest::Error> {
        let forwarder = Forwarder::new(&config.timeouts)?;
        let passthrough = config
            .passthrough
            .origin
            .as_deref()
            .map(|origin| Arc::from(origin.trim().trim_end_matches('/')));

        let state = AppState {
            resolver: Arc::new(resolver),
            forwarder,
            passthrough,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                request_id = %request_id(req.headers()),
            )
        });

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(trace)
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server until `shutdown` flips to `true`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            output = %self.config.output,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Resolves the path, then forwards, passes through, or answers 404.
/// Paths with dot segments are refused before resolution.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    if has_dot_segment(&path_and_query) {
        tracing::debug!(request_id = %request_id, path = %path_and_query, "Rejected path with dot segments");
        metrics::record_request("none", Outcome::Rejected, 400, start_time);
        return ProxyError::InvalidUri(path_and_query).into_response();
    }

    let (rule, outcome, destination) = match state.resolver.resolve(&path_and_query) {
        Resolution::Rewrite { rule, destination } => (rule, Outcome::Rewritten, destination),
        Resolution::NoMatch => match &state.passthrough {
            Some(origin) => (
                "none".to_string(),
                Outcome::Passthrough,
                format!("{origin}{path_and_query}"),
            ),
            None => {
                tracing::debug!(request_id = %request_id, path = %path_and_query, "No rewrite rule matched");
                metrics::record_request("none", Outcome::NotFound, 404, start_time);
                return (StatusCode::NOT_FOUND, "Not Found").into_response();
            }
        },
    };

    tracing::debug!(
        request_id = %request_id,
        rule = %rule,
        outcome = outcome.as_str(),
        destination = %destination,
        "Forwarding request"
    );

    let response = match state.forwarder.forward(request, &destination).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, destination = %destination, error = %e, "Upstream error");
            e.into_response()
        }
    };

    metrics::record_request(&rule, outcome, response.status().as_u16(), start_time);
    response
}
