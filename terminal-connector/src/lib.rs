//! Terminal connector for the finance gateway
//!
//! Everything that touches the trading terminal lives here: the
//! [`TerminalConnector`] trait, the request-scoped [`SessionManager`], the
//! HTTP bridge implementation used in production and an in-memory
//! implementation for tests.

pub mod bridge;
pub mod connector;
pub mod memory;
pub mod session;

pub use bridge::{BridgeConfig, BridgeError, Mt5BridgeConnector};
pub use connector::TerminalConnector;
pub use memory::{ConnectorStats, InMemoryConnector};
pub use session::SessionManager;
