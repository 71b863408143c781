//! API handlers
//!
//! Each terminal-backed handler follows the same pattern:
//! - Read the raw body and validate it before touching the terminal
//! - Run the terminal calls inside one session from the shared `SessionManager`
//! - Map the result to the standardized response envelope

pub mod account;
pub mod fallback;
pub mod health;
pub mod history;
pub mod response;

// Re-export the response module for easy access
pub use response::{AccountInfoResponse, HealthResponse, HistoryResponse, ResponseStatus};
