//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request path against a literal prefix (case-sensitive)
//! - Capture the remainder after the prefix as the wildcard value
//!
//! # Design Decisions
//! - Only relative request paths can match; absolute URLs never do
//! - No regex to guarantee O(n) matching

use crate::routing::pattern::PathTemplate;

/// Matches a literal path prefix and captures what follows it.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn from_template(template: &PathTemplate) -> Self {
        Self::new(template.prefix.clone())
    }

    /// Returns the captured wildcard value, verbatim, if `path` matches.
    pub fn capture<'a>(&self, path: &'a str) -> Option<&'a str> {
        if !is_relative_path(path) {
            return None;
        }
        path.strip_prefix(self.prefix.as_str())
    }
}

/// A request path as seen by the proxy: starts with a single `/`.
///
/// `//host/...` is scheme-relative and treated like an absolute URL.
pub fn is_relative_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}

/// True when `path` has a `.` or `..` segment, literal or percent-encoded.
///
/// URL parsers collapse such segments, which would move a rewritten
/// request outside the destination prefix.
pub fn has_dot_segment(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}
