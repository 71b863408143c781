//! HTTP gateway over a MetaTrader 5 terminal
//!
//! Credentials arrive in plaintext JSON bodies and are forwarded to the
//! terminal on every request; deploy behind TLS.

pub mod api;
pub mod config;
pub mod error;
pub mod routes;

use terminal_connector::SessionManager;

pub use routes::create_router;

/// App state shared across handlers
pub struct AppState {
    /// Process-wide terminal session owner
    pub sessions: SessionManager,
    /// Service name reported by the health endpoint
    pub service_name: String,
}

impl AppState {
    /// Create the shared state
    pub fn new(sessions: SessionManager, service_name: impl Into<String>) -> Self {
        Self {
            sessions,
            service_name: service_name.into(),
        }
    }
}
