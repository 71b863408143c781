//! Domain models for the finance gateway

pub mod record;
pub mod request;

pub use record::{FieldValue, Record};
pub use request::{AccountInfoRequest, Credentials, DateRange, HistoryQuery, HistoryRequest};
