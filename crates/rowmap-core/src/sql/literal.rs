#![allow(clippy::result_large_err)]

use crate::errors::{binding, Result};
use crate::value::{Value, TIMESTAMP_FORMAT};

/// Render a value as an inline SQL literal
///
/// Text is single-quoted with embedded quotes doubled; numbers, booleans and
/// timestamps are emitted bare. Float output does not depend on locale.
///
/// # Errors
///
/// NaN and infinite floats have no SQL literal and fail with a binding error.
pub fn inline_value(value: &Value) -> Result<String> {
    let literal = match value {
        Value::Null => "NULL".to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::Float(v) if v.is_finite() => v.to_string(),
        Value::Float(v) => {
            return Err(binding("float literal", format!("{} cannot be inlined", v)))
        }
        Value::Bool(v) => if *v { "true" } else { "false" }.to_string(),
        Value::Timestamp(v) => v.format(TIMESTAMP_FORMAT).to_string(),
    };
    Ok(literal)
}
