//! The terminal connector seam
//!
//! A connector is the gateway's only way to reach the trading terminal. It
//! mirrors the terminal library's own calling convention: `initialize` reports
//! success as a boolean, data calls return `None` on failure, and the reason
//! for the last failure is read back through `last_error`.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use common::{Credentials, NativeError, Record};

/// Session-based access to a trading terminal
///
/// Only one session may be active per connector. Callers go through
/// [`SessionManager`](crate::SessionManager) rather than driving a connector
/// directly.
#[async_trait]
pub trait TerminalConnector: Send {
    /// Log in to the terminal, returning false on failure
    async fn initialize(&mut self, credentials: &Credentials) -> bool;

    /// Code and description of the most recent failure
    async fn last_error(&mut self) -> NativeError;

    /// Snapshot of the logged-in trading account
    async fn account_info(&mut self) -> Option<Record>;

    /// Deals executed in `[from, to)`
    ///
    /// `None` means the terminal call failed; an empty list is a valid answer.
    async fn history_deals_get(
        &mut self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Option<Vec<Record>>;

    /// End the session. Safe to call when no session is open.
    async fn shutdown(&mut self);
}
