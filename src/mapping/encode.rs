use super::record::{Record, Role};
use super::value::{Value, ValueKind};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Default name of the member that holds the point's timestamp.
pub const DEFAULT_TIME_FIELD: &str = "time";

/// A record split into the parts of a database point
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    /// `None` when the record has no time member
    pub timestamp: Option<DateTime<Utc>>,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, Value>,
    /// Measurement member if set, otherwise the record's type name
    pub measurement: String,
}

/// Encode `record`, treating the member resolved to `time_field` as the timestamp.
///
/// Members holding `None` are left out of both tags and fields.
pub fn encode<R: Record>(record: &R, time_field: &str) -> Result<Encoded> {
    let mut encoded = Encoded {
        timestamp: None,
        tags: BTreeMap::new(),
        fields: BTreeMap::new(),
        measurement: String::new(),
    };

    for member in R::schema().members() {
        if member.role == Role::Ignored {
            continue;
        }
        let Some(value) = record.get(member.member) else {
            continue;
        };

        if member.role == Role::Measurement {
            if let Value::String(name) = value {
                encoded.measurement = name;
            }
            continue;
        }

        let name = member.name();
        if name == time_field {
            match value {
                Value::Time(t) => encoded.timestamp = Some(t),
                Value::Null if member.kind == ValueKind::Time => {}
                other => {
                    return Err(Error::TimeFieldTypeMismatch {
                        field: name.to_string(),
                        found: other.kind(),
                    })
                }
            }
            continue;
        }

        if value.is_null() {
            continue;
        }
        if member.descriptor.is_tag {
            encoded.tags.insert(name.to_string(), value.to_string());
        }
        if member.descriptor.is_field {
            encoded.fields.insert(name.to_string(), value);
        }
    }

    if encoded.measurement.is_empty() {
        encoded.measurement = R::type_name().to_string();
    }

    Ok(encoded)
}
