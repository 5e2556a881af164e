//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign x-request-id)
//!     → routing::RewriteResolver (Rewrite or NoMatch)
//!     → forward.rs (send upstream, stream the response back)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::{Forwarder, ProxyError};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
