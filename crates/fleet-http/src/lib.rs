//! fleet-http: HTTP API for the orchestrator
//!
//! ```text
//! fleet-service binary
//!     └── fleet-http (this crate)
//!         ├── Middleware stack (CORS, tracing, timeout, request logging)
//!         └── Router
//!             ├── /health, /metrics
//!             └── /api/{execute, schedules, status, history, bots}
//! ```

pub mod middleware;
pub mod router;
pub mod server;

pub use middleware::{MiddlewareConfig, MiddlewareStack};
pub use router::{create_router, ApiError, FleetState};
pub use server::{HttpServer, HttpServerBuilder};

/// Error types for the HTTP server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
