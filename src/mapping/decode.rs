use super::encode::DEFAULT_TIME_FIELD;
use super::record::{Record, Role};
use super::value::{Value, ValueKind};
use crate::client::Row;
use crate::error::{DecodeError, DecodeErrors, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Column the database uses for point timestamps.
pub const TIME_COLUMN: &str = "time";

/// Decode row groups into `out`, appending one record per matching value tuple.
///
/// Decoding never stops at a bad value: every tuple and member is processed
/// and all failures are returned together. Records decoded before and after
/// a failure stay in `out`.
pub fn decode<R: Record>(rows: &[Row], out: &mut Vec<R>) -> Result<()> {
    decode_with_time_field(rows, DEFAULT_TIME_FIELD, out)
}

/// Like [`decode`], with the member resolved to `time_field` read from the time column.
pub fn decode_with_time_field<R: Record>(
    rows: &[Row],
    time_field: &str,
    out: &mut Vec<R>,
) -> Result<()> {
    let schema = R::schema();
    let mut errs = DecodeErrors::default();
    let mut type_error = false;

    for row in rows {
        let col_index: HashMap<&str, usize> = row
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        for tuple in &row.values {
            let mut record = R::default();
            let mut matched = false;

            for member in schema.members() {
                match member.role {
                    Role::Ignored => continue,
                    Role::Measurement => {
                        // The series name alone never makes a row worth keeping.
                        if let Err(value) =
                            record.set(member.member, Value::String(row.name.clone()))
                        {
                            if !type_error {
                                errs.push(DecodeError::TypeMismatch {
                                    column: member.name().to_string(),
                                    found: value.kind(),
                                    expected: member.kind,
                                });
                                type_error = true;
                            }
                        }
                        continue;
                    }
                    Role::Value => {}
                }

                let name = member.name();
                let column = if name == time_field { TIME_COLUMN } else { name };

                let value = match col_index.get(column) {
                    Some(&i) => tuple.get(i).cloned(),
                    None => row.tags.get(column).map(|t| Value::String(t.clone())),
                };
                let value = match value {
                    Some(Value::Null) | None => continue,
                    Some(v) => v,
                };

                let value = match coerce(column, value, member.kind) {
                    Ok(v) => v,
                    Err(e) => {
                        errs.push(e);
                        continue;
                    }
                };

                match record.set(member.member, value) {
                    Ok(()) => matched = true,
                    Err(value) => {
                        if !type_error {
                            errs.push(DecodeError::TypeMismatch {
                                column: column.to_string(),
                                found: value.kind(),
                                expected: member.kind,
                            });
                            type_error = true;
                        }
                    }
                }
            }

            if matched {
                out.push(record);
            }
        }
    }

    if errs.is_empty() {
        Ok(())
    } else {
        warn!(errors = errs.len(), "decode finished with errors");
        Err(errs.into())
    }
}

/// Convert text times and undecoded numbers toward the member's kind.
///
/// Anything else is passed through unchanged for the kind check.
fn coerce(column: &str, value: Value, target: ValueKind) -> std::result::Result<Value, DecodeError> {
    match (value, target) {
        (Value::String(s), ValueKind::Time) => DateTime::parse_from_rfc3339(&s)
            .map(|t| Value::Time(t.with_timezone(&Utc)))
            .map_err(|source| DecodeError::TimeParse {
                column: column.to_string(),
                value: s,
                source,
            }),
        (Value::Number(n), ValueKind::Float) => match n.parse::<f64>() {
            Ok(v) => Ok(Value::Float(v)),
            Err(_) => Err(numeric_error(column, n, target)),
        },
        (Value::Number(n), ValueKind::Integer) => match n.parse::<i64>() {
            Ok(v) => Ok(Value::Integer(v)),
            Err(_) => Err(numeric_error(column, n, target)),
        },
        (Value::Number(n), ValueKind::UnsignedInteger) => match n.parse::<u64>() {
            Ok(v) => Ok(Value::UnsignedInteger(v)),
            Err(_) => Err(numeric_error(column, n, target)),
        },
        (value, _) => Ok(value),
    }
}

fn numeric_error(column: &str, value: String, target: ValueKind) -> DecodeError {
    DecodeError::NumericConversion {
        column: column.to_string(),
        value,
        target,
    }
}
