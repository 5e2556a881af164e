//! Rewrite pattern parsing.
//!
//! Patterns are a literal path prefix followed by one trailing wildcard
//! segment, e.g. `/api/:path*`. Destinations use the same shape, optionally
//! preceded by an absolute `http(s)://host` origin.

use std::fmt;

use thiserror::Error;

use crate::config::origin::normalize_origin;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("pattern must start with '/'")]
    NotAbsolutePath,
    #[error("pattern must end with a wildcard segment like '/:path*'")]
    MissingWildcard,
    #[error("invalid wildcard name '{0}'")]
    InvalidParamName(String),
    #[error("unexpected '{0}' in literal prefix")]
    UnexpectedToken(char),
    #[error("invalid destination origin: {0}")]
    InvalidOrigin(String),
}

/// A parsed `<prefix>:<param>*` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    /// Literal prefix, always starting and ending with `/`.
    pub prefix: String,
    /// Name of the trailing wildcard.
    pub param: String,
}

impl PathTemplate {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolutePath);
        }

        // rfind always succeeds: the pattern starts with '/'
        let split = pattern.rfind('/').map_or(0, |i| i + 1);
        let (prefix, segment) = pattern.split_at(split);

        let param = segment
            .strip_prefix(':')
            .and_then(|s| s.strip_suffix('*'))
            .ok_or(PatternError::MissingWildcard)?;
        if param.is_empty() || !param.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PatternError::InvalidParamName(param.to_string()));
        }
        if let Some(c) = prefix.chars().find(|c| matches!(c, ':' | '*' | '?' | '#')) {
            return Err(PatternError::UnexpectedToken(c));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            param: param.to_string(),
        })
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}*", self.prefix, self.param)
    }
}

/// Base a destination is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationBase {
    /// The process-wide backend origin.
    BackendOrigin,
    /// A fixed origin written into the rule itself.
    Literal(String),
}

impl fmt::Display for DestinationBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationBase::BackendOrigin => f.write_str("{origin}"),
            DestinationBase::Literal(origin) => f.write_str(origin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTemplate {
    pub base: DestinationBase,
    pub path: PathTemplate,
}

impl fmt::Display for DestinationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.path)
    }
}

impl DestinationTemplate {
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }

        let Some(scheme_end) = template.find("://") else {
            return Ok(Self {
                base: DestinationBase::BackendOrigin,
                path: PathTemplate::parse(template)?,
            });
        };

        let authority_start = scheme_end + 3;
        let path_start = template[authority_start..]
            .find('/')
            .map(|i| authority_start + i)
            .ok_or(PatternError::MissingWildcard)?;
        let (origin, path) = template.split_at(path_start);

        let origin = normalize_origin(origin)
            .map_err(|e| PatternError::InvalidOrigin(e.to_string()))?;

        Ok(Self {
            base: DestinationBase::Literal(origin),
            path: PathTemplate::parse(path)?,
        })
    }
}
