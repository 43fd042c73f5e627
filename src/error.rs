//! Error types for the helper

use crate::mapping::ValueKind;
use std::fmt;
use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// A write or query was attempted before a database was selected
    #[error("no database selected")]
    NoDatabaseSelected,

    /// A write had no measurement to go to
    #[error("no measurement selected")]
    NoMeasurementSelected,

    /// A point must carry at least one field
    #[error("point for measurement `{0}` has no fields")]
    NoFields(String),

    /// The member named like the time field does not hold a timestamp
    #[error("time field `{field}` must hold a timestamp, found {found}")]
    TimeFieldTypeMismatch {
        /// Resolved member name
        field: String,
        /// Kind the member actually holds
        found: ValueKind,
    },

    /// One or more values could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeErrors),

    /// Error reported by the transport or the database behind it
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// A single value that failed to decode
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A time column held text that is not RFC 3339
    #[error("error parsing time `{value}` in column `{column}`: {source}")]
    TimeParse {
        column: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Decimal text could not be converted to the target number type
    #[error("error converting number `{value}` in column `{column}` to {target}")]
    NumericConversion {
        column: String,
        value: String,
        target: ValueKind,
    },

    /// Value kind does not match the member type
    #[error("type mismatch on decode of column `{column}`: {found} != {expected}")]
    TypeMismatch {
        column: String,
        found: ValueKind,
        expected: ValueKind,
    },
}

/// Every error accumulated over one decode call, in encounter order
#[derive(Debug, Default)]
pub struct DecodeErrors(Vec<DecodeError>);

impl DecodeErrors {
    pub fn push(&mut self, error: DecodeError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodeError> {
        self.0.iter()
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeErrors {}

/// Errors from talking to the database
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request error (boxed to keep enum small)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<reqwest::Error>),

    /// Non-success status without a database error message
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Error message returned by the database
    #[error("database error: {0}")]
    Database(String),

    /// Malformed response body
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Timestamp cannot be expressed in nanoseconds since the epoch
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(chrono::DateTime<chrono::Utc>),

    /// Point that line protocol cannot express
    #[error("invalid point for measurement `{measurement}`: {reason}")]
    InvalidPoint { measurement: String, reason: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(Box::new(err))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
