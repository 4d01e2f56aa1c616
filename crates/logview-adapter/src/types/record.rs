/*
[INPUT]:  Parsed JSON objects from NDJSON lines
[OUTPUT]: Immutable Record values with timestamp helpers
[POS]:    Data model - one log record
[UPDATE]: When changing reserved keys or timestamp formats
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key holding the record timestamp.
pub const TIME_KEY: &str = "_time";

/// One log record: an open JSON object with its key order preserved.
///
/// Records are immutable once parsed. Only `_time` carries meaning, and only
/// for display; all other keys are opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a record from a parsed JSON value. Non-object values are rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw `_time` value as sent by the source.
    pub fn raw_time(&self) -> Option<&Value> {
        self.0.get(TIME_KEY)
    }

    /// Parse `_time` as epoch milliseconds (number or numeric string) or RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.raw_time()? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|ms| ms as i64))
                .and_then(DateTime::from_timestamp_millis),
            Value::String(raw) => parse_time_str(raw),
            _ => None,
        }
    }

    /// Compact single-line JSON, keys in original order.
    pub fn to_compact_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Indented JSON for expanded display.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }
}

fn parse_time_str(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    if let Ok(ms) = trimmed.parse::<f64>() {
        return DateTime::from_timestamp_millis(ms as i64);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
