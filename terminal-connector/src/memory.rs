//! In-memory terminal connector
//!
//! A scripted connector for tests and local runs without a terminal. Clones
//! share state, so a test can keep one handle, hand another to the
//! [`SessionManager`](crate::SessionManager), and inspect the calls afterwards.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Notify;

use common::{Credentials, NativeError, Record};

use crate::connector::TerminalConnector;

/// Call counters and captured arguments of an [`InMemoryConnector`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorStats {
    /// Number of `initialize` calls
    pub initialize_calls: usize,
    /// Number of `shutdown` calls
    pub shutdown_calls: usize,
    /// Number of `account_info` calls
    pub account_info_calls: usize,
    /// Bounds passed to each `history_deals_get` call
    pub deal_queries: Vec<(NaiveDateTime, NaiveDateTime)>,
    /// Logins passed to `initialize`
    pub logins: Vec<i64>,
    /// Whether a session is currently open
    pub session_open: bool,
}

#[derive(Debug)]
struct State {
    login_error: Option<NativeError>,
    fetch_error: NativeError,
    account: Option<Record>,
    deals: Option<Vec<Record>>,
    panic_on_fetch: bool,
    fetch_gate: Option<Arc<Notify>>,
    last_error: Option<NativeError>,
    stats: ConnectorStats,
}

impl Default for State {
    fn default() -> Self {
        Self {
            login_error: None,
            fetch_error: NativeError::new(NativeError::RES_E_FAIL, "Terminal: No data"),
            account: None,
            deals: Some(Vec::new()),
            panic_on_fetch: false,
            fetch_gate: None,
            last_error: None,
            stats: ConnectorStats::default(),
        }
    }
}

/// Scripted terminal connector
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    state: Arc<Mutex<State>>,
}

impl Default for InMemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnector {
    /// A connector that accepts any login and holds no data
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Reject every login with `error`
    pub fn with_login_error(self, error: NativeError) -> Self {
        self.lock().login_error = Some(error);
        self
    }

    /// Serve `account` from `account_info`
    pub fn with_account(self, account: Record) -> Self {
        self.lock().account = Some(account);
        self
    }

    /// Serve `deals` from `history_deals_get`, filtered by their `time` field
    pub fn with_deals(self, deals: Vec<Record>) -> Self {
        self.lock().deals = Some(deals);
        self
    }

    /// Make `history_deals_get` fail
    pub fn without_deals(self) -> Self {
        self.lock().deals = None;
        self
    }

    /// Error reported after a failed data call
    pub fn with_fetch_error(self, error: NativeError) -> Self {
        self.lock().fetch_error = error;
        self
    }

    /// Panic inside every data call
    pub fn panicking_on_fetch(self) -> Self {
        self.lock().panic_on_fetch = true;
        self
    }

    /// Hold the next data call until `gate` is notified
    ///
    /// Only the first data call after this waits; later calls return at once.
    pub fn holding_next_fetch(self, gate: Arc<Notify>) -> Self {
        self.lock().fetch_gate = Some(gate);
        self
    }

    /// Snapshot of the calls made so far
    pub fn stats(&self) -> ConnectorStats {
        self.lock().stats.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State is only mutated in short non-panicking sections
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fail(&self) {
        let mut state = self.lock();
        state.last_error = Some(state.fetch_error.clone());
    }

    async fn wait_for_gate(&self) {
        let gate = self.lock().fetch_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn check_panic(&self) {
        let panic_on_fetch = self.lock().panic_on_fetch;
        if panic_on_fetch {
            panic!("terminal connection dropped");
        }
    }
}

#[async_trait]
impl TerminalConnector for InMemoryConnector {
    async fn initialize(&mut self, credentials: &Credentials) -> bool {
        let mut state = self.lock();
        state.stats.initialize_calls += 1;
        state.stats.logins.push(credentials.login);

        match state.login_error.clone() {
            Some(error) => {
                state.last_error = Some(error);
                false
            }
            None => {
                state.last_error = None;
                state.stats.session_open = true;
                true
            }
        }
    }

    async fn last_error(&mut self) -> NativeError {
        self.lock()
            .last_error
            .clone()
            .unwrap_or_else(NativeError::success)
    }

    async fn account_info(&mut self) -> Option<Record> {
        self.lock().stats.account_info_calls += 1;
        self.wait_for_gate().await;
        self.check_panic();

        let account = self.lock().account.clone();
        if account.is_none() {
            self.fail();
        }
        account
    }

    async fn history_deals_get(
        &mut self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Option<Vec<Record>> {
        self.lock().stats.deal_queries.push((from, to));
        self.wait_for_gate().await;
        self.check_panic();

        let deals = self.lock().deals.clone();
        match deals {
            Some(deals) => Some(
                deals
                    .into_iter()
                    .filter(|deal| {
                        deal.deal_time()
                            .map_or(true, |time| time >= from && time < to)
                    })
                    .collect(),
            ),
            None => {
                self.fail();
                None
            }
        }
    }

    async fn shutdown(&mut self) {
        let mut state = self.lock();
        state.stats.shutdown_calls += 1;
        state.stats.session_open = false;
    }
}
