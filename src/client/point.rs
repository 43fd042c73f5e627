//! Points and their line-protocol form

use crate::error::TransportError;
use crate::mapping::{Encoded, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Timestamp precision used when writing points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }

    fn nanos_per_unit(&self) -> i64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 3_600 * 1_000_000_000,
        }
    }

    /// Express `t` in this precision, truncating toward the epoch.
    pub fn timestamp(&self, t: &DateTime<Utc>) -> Result<i64, TransportError> {
        t.timestamp_nanos_opt()
            .map(|nanos| nanos / self.nanos_per_unit())
            .ok_or(TransportError::TimestampOutOfRange(*t))
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ns" | "n" => Ok(Self::Nanoseconds),
            "u" | "us" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            other => Err(format!(
                "unknown precision '{}'; expected one of ns, u, ms, s, m, h",
                other
            )),
        }
    }
}

/// A single point ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, Value>,
    /// Left to the server when `None`
    pub timestamp: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// Build a point from an encoded record, writing it to `measurement`.
    pub fn from_encoded(measurement: impl Into<String>, encoded: Encoded) -> Self {
        Self {
            measurement: measurement.into(),
            tags: encoded.tags,
            fields: encoded.fields,
            timestamp: encoded.timestamp,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn timestamp(mut self, t: DateTime<Utc>) -> Self {
        self.timestamp = Some(t);
        self
    }

    /// Render this point as one line of line protocol.
    ///
    /// Tags with empty values are left out.
    ///
    /// Format: `<measurement>[,<tag_key>=<tag_value>...] <field_key>=<field_value>[,...] [<timestamp>]`
    pub fn to_line_protocol(&self, precision: Precision) -> Result<String, TransportError> {
        self.check_name("measurement", &self.measurement)?;
        let mut line = escape_measurement(&self.measurement);

        for (key, value) in self.tags.iter().filter(|(_, v)| !v.is_empty()) {
            self.check_name("tag key", key)?;
            self.check_name("tag value", value)?;
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        let mut first = true;
        for (key, value) in &self.fields {
            self.check_name("field key", key)?;
            let Some(rendered) = field_value(value) else {
                continue;
            };
            if let Value::Float(v) = value {
                if !v.is_finite() {
                    return Err(self.invalid(format!("field `{}` is {}", key, v)));
                }
            }
            line.push(if first { ' ' } else { ',' });
            first = false;
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&rendered);
        }

        if let Some(t) = &self.timestamp {
            line.push(' ');
            line.push_str(&precision.timestamp(t)?.to_string());
        }

        Ok(line)
    }

    // Line protocol has no escape for line breaks, and a trailing backslash
    // would escape the separator after it.
    fn check_name(&self, what: &str, s: &str) -> Result<(), TransportError> {
        if s.contains(['\n', '\r']) {
            return Err(self.invalid(format!("{} {:?} contains a line break", what, s)));
        }
        if s.ends_with('\\') {
            return Err(self.invalid(format!("{} {:?} ends with a backslash", what, s)));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> TransportError {
        TransportError::InvalidPoint {
            measurement: self.measurement.clone(),
            reason,
        }
    }
}

/// Render points as a line-protocol body, one point per line.
pub fn to_line_protocol(points: &[Point], precision: Precision) -> Result<String, TransportError> {
    let lines = points
        .iter()
        .map(|p| p.to_line_protocol(precision))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(v) => Some(v.to_string()),
        Value::Integer(v) => Some(format!("{}i", v)),
        Value::UnsignedInteger(v) => Some(format!("{}u", v)),
        Value::Float(v) => Some(v.to_string()),
        Value::Number(v) => Some(v.clone()),
        Value::String(v) => Some(quote(v)),
        Value::Time(v) => Some(quote(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escape special characters in measurement names
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape special characters in tag keys/values and field keys
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
