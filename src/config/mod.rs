//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → origin.rs (env variable or fallback → BackendOrigin)
//!     → ProxyConfig + BackendOrigin (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The process environment is only read through an injected lookup

pub mod loader;
pub mod origin;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigurationError};
pub use origin::BackendOrigin;
pub use schema::{
    BackendConfig, ListenerConfig, ObservabilityConfig, OutputMode, PassthroughConfig,
    ProxyConfig, RewriteRuleConfig, TimeoutConfig,
};
pub use validation::ValidationError;
