//! Backend origin resolution.
//!
//! The origin is read from an environment variable when set and non-empty,
//! otherwise from the configured fallback. The lookup function is injected so
//! only the binary touches the real process environment.

use url::Url;

use crate::config::schema::BackendConfig;
use crate::config::validation::ValidationError;

/// Where the active origin was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginSource {
    Environment(String),
    Fallback,
}

/// The validated base URL all relative rewrite destinations point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOrigin {
    base: String,
    source: OriginSource,
}

impl BackendOrigin {
    /// Resolve the origin from `config`, consulting `lookup` for the
    /// environment variable.
    pub fn resolve<F>(config: &BackendConfig, lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = if config.env_var.is_empty() {
            None
        } else {
            lookup(&config.env_var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        match from_env {
            Some(value) => {
                let base = normalize_origin(&value)?;
                Ok(Self {
                    base,
                    source: OriginSource::Environment(config.env_var.clone()),
                })
            }
            None => Ok(Self {
                base: normalize_origin(&config.fallback)?,
                source: OriginSource::Fallback,
            }),
        }
    }

    /// Build an origin directly from a URL string.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            base: normalize_origin(value)?,
            source: OriginSource::Fallback,
        })
    }

    /// Origin without a trailing slash, ready for path concatenation.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub fn source(&self) -> &OriginSource {
        &self.source
    }
}

impl std::fmt::Display for BackendOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

/// Validate an origin URL and strip trailing slashes.
///
/// Accepts `http` and `https` URLs with a host and no query or fragment.
/// A base path (`https://host/prefix`) is kept.
pub fn normalize_origin(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyOrigin);
    }

    let invalid = |reason: &str| ValidationError::InvalidOrigin {
        origin: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
