//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check rewrite patterns and that destinations reuse the source wildcard
//! - Validate origins, addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::origin::normalize_origin;
use crate::config::schema::ProxyConfig;
use crate::routing::pattern::PatternError;
use crate::routing::resolver::CompiledRule;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend origin is empty")]
    EmptyOrigin,

    #[error("invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("rule '{rule}': invalid source pattern: {reason}")]
    InvalidSource { rule: String, reason: PatternError },

    #[error("rule '{rule}': invalid destination: {reason}")]
    InvalidDestination { rule: String, reason: PatternError },

    #[error("rule '{rule}': destination uses ':{destination_param}*' but source captures ':{source_param}*'")]
    PlaceholderMismatch {
        rule: String,
        source_param: String,
        destination_param: String,
    },

    #[error("duplicate rule name '{0}'")]
    DuplicateRuleName(String),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check everything that can be checked without the process environment.
///
/// An empty fallback is accepted here because the environment may still
/// supply the origin; that is decided by
/// [`BackendOrigin::resolve`](crate::config::origin::BackendOrigin::resolve).
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.backend.env_var.is_empty() && config.backend.fallback.trim().is_empty() {
        errors.push(ValidationError::EmptyOrigin);
    } else if !config.backend.fallback.trim().is_empty() {
        if let Err(e) = normalize_origin(&config.backend.fallback) {
            errors.push(e);
        }
    }

    let mut names = HashSet::new();
    for (index, rule) in config.rewrites.iter().enumerate() {
        let name = rule.display_name(index);
        if !names.insert(name.clone()) {
            errors.push(ValidationError::DuplicateRuleName(name));
        }
        if let Err(e) = CompiledRule::compile(index, rule) {
            errors.push(e);
        }
    }

    if let Some(origin) = &config.passthrough.origin {
        if let Err(e) = normalize_origin(origin) {
            errors.push(e);
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
