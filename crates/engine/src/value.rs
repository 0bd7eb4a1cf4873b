//! Cell values and rows.
//!
//! Rows are schema-agnostic key -> value maps; a key that is absent reads as
//! `Value::Null`. Row identity is positional (index in the row array).

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// A row: column key -> value.
pub type Row = FxHashMap<String, Value>;

static NULL: Value = Value::Null;

/// Read a key from a row, treating a missing key as `Null`.
pub fn row_value<'a>(row: &'a Row, key: &str) -> &'a Value {
    row.get(key).unwrap_or(&NULL)
}

/// Build a row from key/value pairs.
pub fn row<I, K, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by number comparators and range filters.
    /// Text is parsed after trimming; only finite results count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Truthiness used by the boolean comparator.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) | Value::DateTime(_) => true,
        }
    }

    /// Milliseconds since the Unix epoch, if this value reads as a date.
    ///
    /// Accepts date/datetime values, plain numbers (already epoch millis) and
    /// ISO 8601 text (`2024-01-31`, `2024-01-31T08:00:00`, RFC 3339).
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis()),
            Value::DateTime(dt) => Some(dt.and_utc().timestamp_millis()),
            Value::Number(n) if n.is_finite() => Some(*n as i64),
            Value::Text(s) => parse_epoch_millis(s.trim()),
            _ => None,
        }
    }

    /// ISO 8601 form for date-like values, used by JSON export.
    pub fn to_iso8601(&self) -> Option<String> {
        match self {
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => Some(dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)),
            _ => None,
        }
    }
}

fn parse_epoch_millis(s: &str) -> Option<i64> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(-1.5).to_string(), "-1.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::text("a\tb").to_string(), "a\tb");

        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2024-03-09");
        let dt = d.and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-09T14:05:00");
    }

    #[test]
    fn test_missing_key_reads_null() {
        let r = row([("a", 1)]);
        assert_eq!(row_value(&r, "a"), &Value::Number(1.0));
        assert!(row_value(&r, "b").is_null());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::text(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Value::text("abc").as_f64(), None);
        assert_eq!(Value::text("").as_f64(), None);
        assert_eq!(Value::Number(f64::NAN).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_epoch_millis() {
        let d = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(Value::Date(d).epoch_millis(), Some(86_400_000));
        assert_eq!(Value::text("1970-01-02").epoch_millis(), Some(86_400_000));
        assert_eq!(Value::text("1970-01-01T00:00:01Z").epoch_millis(), Some(1_000));
        assert_eq!(Value::text("1970-01-01T00:00:02").epoch_millis(), Some(2_000));
        assert_eq!(Value::text("not a date").epoch_millis(), None);
        assert_eq!(Value::Bool(true).epoch_millis(), None);
    }

    #[test]
    fn test_iso8601() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_iso8601().unwrap(), "2024-01-05T10:00:00.000Z");
        assert_eq!(Value::Number(1.0).to_iso8601(), None);
    }
}
