//! Helpers for writing transforms over the generic representation.
//!
//! Each helper reports failures as [`MigrateError`] variants that name the
//! offending field, so a transform can use `?` and the caller sees exactly
//! which key was missing or malformed.

use crate::error::{MigrateError, MigrateResult};
use backdate_types::{Attrs, Supplemental};
use serde_json::{Number, Value};

/// Reads a required key from the caller's supplemental data.
pub fn supplemental<'a>(data: &'a Supplemental, field: &str) -> MigrateResult<&'a Value> {
    data.get(field).ok_or_else(|| MigrateError::MissingSupplemental {
        field: field.to_string(),
    })
}

/// Reads a required key from the representation.
pub fn field<'a>(attrs: &'a Attrs, field: &str) -> MigrateResult<&'a Value> {
    attrs.get(field).ok_or_else(|| MigrateError::MissingField {
        field: field.to_string(),
    })
}

/// Removes a required key from the representation, returning its value.
pub fn take_field(attrs: &mut Attrs, field: &str) -> MigrateResult<Value> {
    attrs.remove(field).ok_or_else(|| MigrateError::MissingField {
        field: field.to_string(),
    })
}

/// Moves the value under `from` to `to`.
pub fn rename_field(attrs: &mut Attrs, from: &str, to: &str) -> MigrateResult<()> {
    let value = take_field(attrs, from)?;
    attrs.insert(to.to_string(), value);
    Ok(())
}

/// Coerces a value to an integer.
///
/// Integers pass through, finite floats are truncated toward zero, booleans
/// become 0/1 and strings are parsed after trimming whitespace.
pub fn to_int(value: &Value, field: &str) -> MigrateResult<Value> {
    let err = || invalid(field, "integer", value);
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => {
            let f = n.as_f64().ok_or_else(err)?;
            if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err(err());
            }
            Ok(Value::from(f.trunc() as i64))
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| err()),
        _ => Err(err()),
    }
}

/// Coerces a value to a float.
///
/// Numbers are widened, booleans become 0.0/1.0 and strings are parsed after
/// trimming whitespace. Non-finite results are rejected since JSON cannot
/// carry them.
pub fn to_float(value: &Value, field: &str) -> MigrateResult<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| invalid(field, "float", value))
}

/// Short name of a JSON value's kind, for error messages.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid(field: &str, expected: &'static str, value: &Value) -> MigrateError {
    MigrateError::InvalidValue {
        field: field.to_string(),
        expected,
        found: format!("{} {}", value_kind(value), value),
    }
}
