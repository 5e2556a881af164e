//! Rewrite lookup.
//!
//! # Responsibilities
//! - Store compiled rewrite rules in configured order
//! - Look up the first rule matching a request path
//! - Return the destination URL or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan (acceptable for typical rule counts)
//! - Query strings are carried over untouched

use serde::Serialize;

use crate::config::origin::BackendOrigin;
use crate::config::schema::RewriteRuleConfig;
use crate::config::validation::ValidationError;
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::pattern::{DestinationBase, DestinationTemplate, PathTemplate};

/// Outcome of resolving one request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// The path matched `rule` and should be forwarded to `destination`.
    Rewrite { rule: String, destination: String },
    /// No rule matched; pass the request through unchanged.
    NoMatch,
}

impl Resolution {
    pub fn destination(&self) -> Option<&str> {
        match self {
            Resolution::Rewrite { destination, .. } => Some(destination),
            Resolution::NoMatch => None,
        }
    }
}

/// A validated rewrite rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    name: String,
    source: PathTemplate,
    matcher: PathPrefixMatcher,
    destination: DestinationTemplate,
}

impl CompiledRule {
    /// Parse and cross-check one configured rule.
    pub fn compile(index: usize, config: &RewriteRuleConfig) -> Result<Self, ValidationError> {
        let name = config.display_name(index);

        let source = PathTemplate::parse(&config.source).map_err(|reason| {
            ValidationError::InvalidSource {
                rule: name.clone(),
                reason,
            }
        })?;
        let destination = DestinationTemplate::parse(&config.destination).map_err(|reason| {
            ValidationError::InvalidDestination {
                rule: name.clone(),
                reason,
            }
        })?;

        if source.param != destination.path.param {
            return Err(ValidationError::PlaceholderMismatch {
                rule: name,
                source_param: source.param,
                destination_param: destination.path.param,
            });
        }

        Ok(Self {
            name,
            matcher: PathPrefixMatcher::from_template(&source),
            source,
            destination,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &PathTemplate {
        &self.source
    }

    pub fn destination(&self) -> &DestinationTemplate {
        &self.destination
    }
}

/// Maps request paths to destination URLs.
#[derive(Debug, Clone)]
pub struct RewriteResolver {
    rules: Vec<CompiledRule>,
    origin: BackendOrigin,
}

impl RewriteResolver {
    /// Compile `rules` against the active backend origin.
    ///
    /// Fails on the first malformed rule; use
    /// [`validate_config`](crate::config::validation::validate_config) to
    /// collect every problem at once.
    pub fn new(rules: &[RewriteRuleConfig], origin: BackendOrigin) -> Result<Self, ValidationError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| CompiledRule::compile(index, rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules, origin })
    }

    /// Resolve a request path (optionally with `?query`).
    pub fn resolve(&self, path_and_query: &str) -> Resolution {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        for rule in &self.rules {
            let Some(captured) = rule.matcher.capture(path) else {
                continue;
            };

            let base = match &rule.destination.base {
                DestinationBase::BackendOrigin => self.origin.as_str(),
                DestinationBase::Literal(origin) => origin.as_str(),
            };

            let prefix = &rule.destination.path.prefix;
            let mut destination = String::with_capacity(
                base.len() + prefix.len() + captured.len() + query.map_or(0, |q| q.len() + 1),
            );
            destination.push_str(base);
            destination.push_str(prefix);
            destination.push_str(captured);
            if let Some(query) = query {
                destination.push('?');
                destination.push_str(query);
            }

            return Resolution::Rewrite {
                rule: rule.name.clone(),
                destination,
            };
        }

        Resolution::NoMatch
    }

    pub fn origin(&self) -> &BackendOrigin {
        &self.origin
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }
}
