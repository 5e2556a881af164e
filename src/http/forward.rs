//! Upstream forwarding.
//!
//! # Responsibilities
//! - Send the client request to a rewritten destination URL
//! - Strip hop-by-hop headers in both directions
//! - Stream request and response bodies without buffering
//! - Map upstream failures to 502 / 504
//!
//! # Design Decisions
//! - Redirects are relayed to the client, never followed
//! - A body is sent upstream only while the inbound one is unfinished,
//!   which covers HTTP/2 requests that carry no length headers

use std::time::Duration;

use axum::{
    body::{Body, HttpBody},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::observability::metrics;

/// Headers that describe a single connection, not the message.
const HOP_BY_HOP: [header::HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream url '{0}'")]
    InvalidUri(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl ProxyError {
    fn kind(&self) -> &'static str {
        match self {
            ProxyError::InvalidUri(_) => "invalid_uri",
            ProxyError::Timeout => "timeout",
            ProxyError::Upstream(_) => "upstream",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUri(_) => StatusCode::BAD_REQUEST,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Timeout
        } else {
            ProxyError::Upstream(e)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        metrics::record_upstream_error(self.kind());
        let message = match &self {
            ProxyError::InvalidUri(_) => "Invalid request path",
            ProxyError::Timeout => "Upstream request timed out",
            ProxyError::Upstream(_) => "Upstream request failed",
        };
        (self.status(), message).into_response()
    }
}

/// Shared HTTP client for upstream calls. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    /// Forward `request` to `destination` and relay the upstream response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        destination: &str,
    ) -> Result<Response, ProxyError> {
        let url = reqwest::Url::parse(destination)
            .map_err(|_| ProxyError::InvalidUri(destination.to_string()))?;

        let (parts, body) = request.into_parts();
        let has_body = !body.is_end_stream();

        let mut headers = upstream_headers(&parts.headers);
        if let Some(host) = parts.headers.get(header::HOST) {
            headers.insert("x-forwarded-host", host.clone());
        }

        let mut upstream = self
            .client
            .request(parts.method, url)
            .headers(headers);
        if has_body {
            upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let response = upstream.send().await?;

        let status = response.status();
        let headers = strip_hop_by_hop(response.headers());
        let mut relayed = Response::new(Body::from_stream(response.bytes_stream()));
        *relayed.status_mut() = status;
        *relayed.headers_mut() = headers;
        Ok(relayed)
    }
}

/// Headers sent upstream: client headers minus hop-by-hop and `Host`.
fn upstream_headers(client: &HeaderMap) -> HeaderMap {
    let mut headers = strip_hop_by_hop(client);
    headers.remove(header::HOST);
    headers
}

fn strip_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    // Headers named in `Connection` are connection-scoped too
    let listed: Vec<String> = source
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if HOP_BY_HOP.contains(name)
            || name.as_str() == "keep-alive"
            || listed.iter().any(|l| l == name.as_str())
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use axum::http::HeaderValue;

    #[test]
    fn test_strips_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-private"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-private", HeaderValue::from_static("secret"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = strip_hop_by_hop(&headers);
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get("keep-alive").is_none());
        assert!(out.get("x-private").is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out.get(header::ACCEPT).unwrap(), "application/json");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_upstream_headers_drop_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("app.example.com"));
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-1"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));

        let out = upstream_headers(&headers);
        assert!(out.get(header::HOST).is_none());
        assert_eq!(out.get(X_REQUEST_ID).unwrap(), "req-1");
        assert_eq!(out.get(header::AUTHORIZATION).unwrap(), "Bearer t");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(ProxyError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ProxyError::InvalidUri("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_invalid_destination() {
        let forwarder = Forwarder::new(&TimeoutConfig::default()).unwrap();
        let request = Request::new(Body::empty());
        let err = forwarder.forward(request, "not a url").await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidUri(_)));
    }
}
