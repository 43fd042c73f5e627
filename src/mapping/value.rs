//! Typed values exchanged with the database

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::ops::Deref;

/// A single tag, field or column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    UnsignedInteger(u64),
    Float(f64),
    String(String),
    Time(DateTime<Utc>),
    /// Decimal text not yet converted to a concrete number type
    Number(String),
}

/// Discriminant of [`Value`], used for type checks and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    UnsignedInteger,
    Float,
    String,
    Time,
    Number,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::UnsignedInteger => "unsigned integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Time => "time",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::UnsignedInteger(_) => ValueKind::UnsignedInteger,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Time(_) => ValueKind::Time,
            Value::Number(_) => ValueKind::Number,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Renders values the way they appear as tag values.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::UnsignedInteger(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Time(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Number(v) => f.write_str(v),
        }
    }
}

/// JSON numbers keep their decimal text until the target type is known.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.to_string()),
            serde_json::Value::String(s) => Value::String(s),
            other => Value::String(other.to_string()),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i64 => Integer,
    i32 => Integer,
    u64 => UnsignedInteger,
    u32 => UnsignedInteger,
    f64 => Float,
    f32 => Float,
    String => String,
    &str => String,
    DateTime<Utc> => Time,
}

/// Series name of a row group on decode, measurement override on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Measurement(pub String);

impl Measurement {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Deref for Measurement {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Measurement {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversion between a record member type and [`Value`].
///
/// `from_value` only accepts a value of the member's own kind; it hands the
/// value back when it does not fit so the caller can report it.
pub trait FieldType: Sized {
    /// Kind the member holds
    const KIND: ValueKind;
    /// Marks the member that carries the measurement name
    const IS_MEASUREMENT: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FieldType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FieldType for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FieldType for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(v) => i32::try_from(v).map_err(|_| Value::Integer(v)),
            other => Err(other),
        }
    }
}

impl FieldType for u64 {
    const KIND: ValueKind = ValueKind::UnsignedInteger;

    fn to_value(&self) -> Value {
        Value::UnsignedInteger(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::UnsignedInteger(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FieldType for u32 {
    const KIND: ValueKind = ValueKind::UnsignedInteger;

    fn to_value(&self) -> Value {
        Value::UnsignedInteger(u64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::UnsignedInteger(v) => u32::try_from(v).map_err(|_| Value::UnsignedInteger(v)),
            other => Err(other),
        }
    }
}

impl FieldType for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FieldType for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(v) if v.is_nan() || v.is_infinite() || v.abs() <= f64::from(f32::MAX) => {
                Ok(v as f32)
            }
            other => Err(other),
        }
    }
}

impl FieldType for String {
    const KIND: ValueKind = ValueKind::String;

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FieldType for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::Time;

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Time(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FieldType for Measurement {
    const KIND: ValueKind = ValueKind::String;
    const IS_MEASUREMENT: bool = true;

    fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(v) => Ok(Measurement(v)),
            other => Err(other),
        }
    }
}

/// `None` encodes to [`Value::Null`] and is left out of the point.
impl<T: FieldType> FieldType for Option<T> {
    const KIND: ValueKind = T::KIND;
    const IS_MEASUREMENT: bool = T::IS_MEASUREMENT;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
