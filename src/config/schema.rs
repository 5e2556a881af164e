//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment variable consulted for the backend origin by default.
pub const DEFAULT_BACKEND_ENV_VAR: &str = "NEXT_PUBLIC_BACKEND_URL";

/// Backend origin used when the environment variable is absent or empty.
pub const DEFAULT_BACKEND_FALLBACK: &str = "http://localhost:8000";

/// Root configuration for the rewrite proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Build output mode (opaque passthrough flag).
    pub output: OutputMode,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend origin resolution strategy.
    pub backend: BackendConfig,

    /// Ordered rewrite rules. First match wins.
    pub rewrites: Vec<RewriteRuleConfig>,

    /// Upstream for requests no rule matched.
    pub passthrough: PassthroughConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            output: OutputMode::default(),
            listener: ListenerConfig::default(),
            backend: BackendConfig::default(),
            rewrites: vec![RewriteRuleConfig::api()],
            passthrough: PassthroughConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Packaging mode of the built artifact.
///
/// Accepted and reported, never acted upon by the proxy itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Default,
    Standalone,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Default => write!(f, "default"),
            OutputMode::Standalone => write!(f, "standalone"),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Where the backend origin comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Environment variable to read. Empty disables the lookup.
    pub env_var: String,

    /// Origin used when the variable is unset or empty.
    pub fallback: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_BACKEND_ENV_VAR.to_string(),
            fallback: DEFAULT_BACKEND_FALLBACK.to_string(),
        }
    }
}

/// A single rewrite rule as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteRuleConfig {
    /// Rule identifier for logging/metrics.
    #[serde(default)]
    pub name: Option<String>,

    /// Source path pattern, e.g. `/api/:path*`.
    pub source: String,

    /// Destination template: `/api/:path*` (relative to the backend origin)
    /// or an absolute `https://host/api/:path*`.
    pub destination: String,
}

impl RewriteRuleConfig {
    /// The `/api/:path*` forwarding rule.
    pub fn api() -> Self {
        Self {
            name: Some("api".to_string()),
            source: "/api/:path*".to_string(),
            destination: "/api/:path*".to_string(),
        }
    }

    /// Configured name, or `rule-<index>` when unnamed.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("rule-{index}"),
        }
    }
}

/// Upstream receiving unmatched requests.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Origin URL. When unset, unmatched requests get 404.
    pub origin: Option<String>,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
