//! Request models and their validation
//!
//! Both gateway endpoints take a JSON body carrying terminal credentials. The
//! history endpoint additionally takes a calendar date range. Validation runs
//! before any terminal session is opened.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Date format accepted for `from_date` and `to_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Terminal login credentials
///
/// The password travels in plaintext in the request body and is forwarded to
/// the terminal on every request. It is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Trading account login number
    pub login: i64,
    /// Trading account password
    pub password: String,
    /// Trade server name
    pub server: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .field("server", &self.server)
            .finish()
    }
}

/// Account info request
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct AccountInfoRequest {
    /// MT5 account login number
    #[cfg_attr(feature = "utoipa", schema(example = 10008011380i64))]
    pub login: i64,
    /// MT5 account password
    pub password: String,
    /// MT5 server name
    #[cfg_attr(feature = "utoipa", schema(example = "MetaQuotes-Demo"))]
    pub server: String,
}

impl AccountInfoRequest {
    /// Validate a parsed JSON body against the account info schema
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Validation(e.to_string()))
    }

    /// Consume the request, keeping only the credentials
    pub fn into_credentials(self) -> Credentials {
        Credentials {
            login: self.login,
            password: self.password,
            server: self.server,
        }
    }
}

/// Trading history request
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct HistoryRequest {
    /// MT5 account login number
    #[cfg_attr(feature = "utoipa", schema(example = 10008011380i64))]
    pub login: i64,
    /// MT5 account password
    pub password: String,
    /// MT5 server name
    #[cfg_attr(feature = "utoipa", schema(example = "MetaQuotes-Demo"))]
    pub server: String,
    /// Start date in YYYY-MM-DD format
    #[cfg_attr(feature = "utoipa", schema(example = "2023-01-01"))]
    pub from_date: String,
    /// End date in YYYY-MM-DD format, inclusive
    #[cfg_attr(feature = "utoipa", schema(example = "2023-01-31"))]
    pub to_date: String,
}

impl HistoryRequest {
    /// Validate a parsed JSON body against the history schema, dates included
    pub fn from_value(value: Value) -> Result<HistoryQuery> {
        let request: HistoryRequest =
            serde_json::from_value(value).map_err(|e| Error::Validation(e.to_string()))?;
        request.validate()
    }

    /// Parse both dates and turn the request into a typed query
    pub fn validate(self) -> Result<HistoryQuery> {
        let from = parse_date("from_date", &self.from_date)?;
        let to = parse_date("to_date", &self.to_date)?;
        let range = DateRange::new(from, to)?;

        Ok(HistoryQuery {
            credentials: Credentials {
                login: self.login,
                password: self.password,
                server: self.server,
            },
            range,
            from_date: self.from_date,
            to_date: self.to_date,
        })
    }
}

/// A validated history request
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    /// Terminal credentials
    pub credentials: Credentials,
    /// Parsed date range
    pub range: DateRange,
    /// `from_date` exactly as the caller sent it
    pub from_date: String,
    /// `to_date` exactly as the caller sent it
    pub to_date: String,
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range covering `from` through `to`, both days included
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        let end = to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::Validation("to_date: Date is out of range".to_string()))?;
        Ok(Self { from, to, end })
    }

    /// Query bounds `[from 00:00, to + 1 day 00:00)`
    ///
    /// The end is exclusive so every deal dated on `to` is covered.
    pub fn query_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.from.and_time(NaiveTime::MIN),
            self.end.and_time(NaiveTime::MIN),
        )
    }
}

/// Parse a YYYY-MM-DD date, naming the offending field on failure
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("{field}: Date must be in YYYY-MM-DD format")))
}

/// Parse a raw request body into JSON
///
/// An empty body, or one whose JSON value is null, false, zero or empty, is
/// treated as absent.
pub fn parse_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::MissingBody);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("Invalid JSON body: {e}")))?;

    if is_empty_value(&value) {
        return Err(Error::MissingBody);
    }

    Ok(value)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
