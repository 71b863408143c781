//! Terminal records and their JSON rendering
//!
//! The terminal hands back account snapshots and deals as flat named records.
//! A [`Record`] keeps the terminal's field order and distinguishes timestamp
//! values from everything else, so the JSON output can render timestamps as
//! ISO-8601 strings and pass the rest through untouched.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Name of the deal field carrying the execution time in Unix seconds
pub const DEAL_TIME_FIELD: &str = "time";

/// A single field value of a terminal record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A point in time, rendered as ISO-8601
    Timestamp(NaiveDateTime),
    /// Any other value, rendered as-is
    Json(Value),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Timestamp(ts) => serializer.serialize_str(&iso8601(ts)),
            FieldValue::Json(value) => value.serialize(serializer),
        }
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(ts: NaiveDateTime) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

/// An ordered set of named fields returned by the terminal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing it in place if it already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in terminal order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Execution time of a deal record, if it has a readable one
    pub fn deal_time(&self) -> Option<NaiveDateTime> {
        match self.get(DEAL_TIME_FIELD)? {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::Json(value) => value.as_i64().and_then(from_unix_seconds),
        }
    }

    /// Prepare a deal for output: its `time` field becomes a timestamp
    ///
    /// Fails when `time` holds something other than whole Unix seconds.
    pub fn into_deal(mut self) -> Result<Self> {
        let converted = match self.get(DEAL_TIME_FIELD) {
            None | Some(FieldValue::Timestamp(_)) => None,
            Some(FieldValue::Json(value)) => {
                let ts = value
                    .as_i64()
                    .and_then(from_unix_seconds)
                    .ok_or_else(|| {
                        Error::Internal(format!(
                            "Deal field `{DEAL_TIME_FIELD}` is not a Unix timestamp: {value}"
                        ))
                    })?;
                Some(ts)
            }
        };

        if let Some(ts) = converted {
            self.insert(DEAL_TIME_FIELD, ts);
        }
        Ok(self)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Records arrive from the terminal bridge as JSON objects; field order is kept
impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of record fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    record.insert(name, FieldValue::Json(value));
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Render a timestamp as ISO-8601 without offset
///
/// Fractional seconds are printed as six microsecond digits, and only when
/// the microsecond part is non-zero. Sub-microsecond precision is dropped.
pub fn iso8601(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() / 1_000 == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Convert Unix seconds to a UTC timestamp
pub fn from_unix_seconds(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}
