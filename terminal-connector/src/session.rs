//! Request-scoped terminal sessions
//!
//! The terminal library permits one active session per process, so the
//! connector lives behind a single async mutex. Every request that needs the
//! terminal waits for the lock, logs in with its own credentials, runs its
//! calls and shuts the session down before releasing the lock. Concurrent
//! requests are therefore serialized; throughput is bounded by the terminal.
//!
//! Once the lock is held the session runs on its own task. Dropping the
//! caller's future (client disconnect, request timeout) detaches from that
//! task without cutting the session short, so `shutdown` still runs.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::{Credentials, Error, Result};

use crate::connector::TerminalConnector;

/// Owner of the process-wide terminal connector
pub struct SessionManager {
    connector: Arc<Mutex<Box<dyn TerminalConnector>>>,
}

impl SessionManager {
    /// Create a session manager around a connector
    pub fn new(connector: impl TerminalConnector + 'static) -> Self {
        let connector: Box<dyn TerminalConnector> = Box::new(connector);
        Self {
            connector: Arc::new(Mutex::new(connector)),
        }
    }

    /// Run `body` inside a freshly opened terminal session
    ///
    /// The session is shut down exactly once on every path: when login fails,
    /// when `body` returns an error, when `body` panics and when the returned
    /// future is dropped after the session opened. A panic is turned into
    /// [`Error::Internal`] carrying the panic message.
    pub async fn with_session<T, F>(&self, credentials: &Credentials, body: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut dyn TerminalConnector) -> BoxFuture<'c, Result<T>>
            + Send
            + 'static,
    {
        let mut connector = self.connector.clone().lock_owned().await;
        let credentials = credentials.clone();

        let session = tokio::spawn(async move {
            info!(
                login = credentials.login,
                server = %credentials.server,
                "Opening terminal session"
            );

            let outcome = if connector.initialize(&credentials).await {
                match AssertUnwindSafe(body(&mut **connector)).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        warn!("Terminal session body panicked: {}", message);
                        Err(Error::Internal(message))
                    }
                }
            } else {
                let native = connector.last_error().await;
                warn!(login = credentials.login, "Terminal login failed: {}", native);
                Err(Error::Connection(native))
            };

            connector.shutdown().await;
            debug!(login = credentials.login, "Terminal session closed");

            outcome
        });

        match session.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(Error::Internal(panic_message(e.into_panic().as_ref()))),
            Err(e) => Err(Error::Internal(format!("Terminal session aborted: {e}"))),
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static text");
        assert_eq!(panic_message(payload.as_ref()), "static text");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned text"));
        assert_eq!(panic_message(payload.as_ref()), "owned text");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }
}
