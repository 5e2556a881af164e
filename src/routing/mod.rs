//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path ("/api/users/42?x=1")
//!     → resolver.rs (ordered rule scan)
//!     → matcher.rs (prefix match, capture wildcard)
//!     → Return: Rewrite { destination } or NoMatch
//!
//! Rule Compilation (at startup):
//!     RewriteRuleConfig[]
//!     → pattern.rs (parse source and destination templates)
//!     → Bind relative destinations to the BackendOrigin
//!     → Freeze as immutable RewriteResolver
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same rule
//! - First match wins (configuration order)

pub mod matcher;
pub mod pattern;
pub mod resolver;

pub use resolver::{Resolution, RewriteResolver};
