//! Small shared types: timestamps, the recognized ticker set, and query
//! parameter building for the prediction-market HTTP fetcher.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Unix timestamp in milliseconds, as used by the upstream quote transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct UnixMs(pub i64);

impl UnixMs {
    /// Create a timestamp for the current time.
    pub fn now() -> Self {
        Self(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0),
        )
    }

    /// Create from a raw millisecond value.
    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Get the raw millisecond value.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert to a chrono DateTime. `None` if out of chrono's representable range.
    pub fn as_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.0)
    }

    /// Convert to a chrono DateTime, falling back to the Unix epoch.
    pub fn as_datetime_or_epoch(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }

    /// Create from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl Serialize for UnixMs {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for UnixMs {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        i64::deserialize(d).map(UnixMs)
    }
}

impl From<i64> for UnixMs {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<UnixMs> for i64 {
    fn from(ts: UnixMs) -> Self {
        ts.0
    }
}

/// Type alias for ticker symbols using small-string optimization.
pub type Symbol = SmolStr;

/// Create a Symbol from a string slice.
pub fn symbol(s: &str) -> Symbol {
    SmolStr::new(s)
}

/// The recognized underlying ticker set.
fn recognized_tickers() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "PLTR", "OPEN",
        ]
        .into_iter()
        .collect()
    })
}

/// Whether `ticker` is in the recognized underlying set.
pub fn is_recognized_ticker(ticker: &str) -> bool {
    recognized_tickers().contains(ticker)
}

/// Query parameter builder for the prediction-market HTTP fetcher.
#[derive(Debug, Default, Clone)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create a new empty query parameter builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Add an optional parameter (only if value is Some).
    pub fn push_opt<T: ToString>(&mut self, key: impl Into<String>, value: Option<T>) {
        if let Some(v) = value {
            self.push(key, v);
        }
    }

    /// Check if there are any parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Convert to a vector of key-value pairs.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.0
    }

    /// Get an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for QueryParams {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Format a date as YYYY-MM-DD.
pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a date from YYYY-MM-DD format.
pub fn parse_date(s: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
