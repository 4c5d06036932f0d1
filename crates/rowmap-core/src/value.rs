//! Typed value container crossing the accessor, binding and literal boundaries
//!
//! `Value` is the closed set of payloads the engine moves between entities,
//! statements and drivers. `Value::Null` is a present database null; an absent
//! value (unmapped property, missing column) is expressed as `Option::None` by
//! the lookups that can miss.

use crate::errors::{binding, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used for literals and for text-encoded driver values
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Declared value type of a mapped property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Int,
    BigInt,
    Float,
    Bool,
    Timestamp,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Int => "int",
            ValueKind::BigInt => "bigint",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind of the payload, `None` for null
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Text(_) => Some(ValueKind::Text),
            Value::Int(_) => Some(ValueKind::Int),
            Value::BigInt(_) => Some(ValueKind::BigInt),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
        }
    }

    /// Convert to the given kind where the conversion loses nothing
    ///
    /// Null converts to null. Used to bring driver scalars (a sequence read
    /// returns a 64-bit integer on most drivers) to a key's declared kind.
    pub fn convert(self, kind: ValueKind) -> Result<Value> {
        let converted = match (self, kind) {
            (Value::Null, _) => Value::Null,
            (Value::Text(s), ValueKind::Text) => Value::Text(s),
            (Value::Text(s), ValueKind::Int) => s
                .trim()
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|e| binding(kind.to_string(), format!("cannot parse '{}': {}", s, e)))?,
            (Value::Text(s), ValueKind::BigInt) => s
                .trim()
                .parse::<i64>()
                .map(Value::BigInt)
                .map_err(|e| binding(kind.to_string(), format!("cannot parse '{}': {}", s, e)))?,
            (Value::Text(s), ValueKind::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| binding(kind.to_string(), format!("cannot parse '{}': {}", s, e)))?,
            (Value::Text(s), ValueKind::Timestamp) => {
                NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
                    .map(Value::Timestamp)
                    .map_err(|e| {
                        binding(kind.to_string(), format!("cannot parse '{}': {}", s, e))
                    })?
            }
            (Value::Int(v), ValueKind::Int) => Value::Int(v),
            (Value::Int(v), ValueKind::BigInt) => Value::BigInt(i64::from(v)),
            (Value::Int(v), ValueKind::Float) => Value::Float(f64::from(v)),
            (Value::Int(v), ValueKind::Text) => Value::Text(v.to_string()),
            (Value::Int(v), ValueKind::Bool) if v == 0 || v == 1 => Value::Bool(v == 1),
            (Value::BigInt(v), ValueKind::BigInt) => Value::BigInt(v),
            (Value::BigInt(v), ValueKind::Int) => i32::try_from(v)
                .map(Value::Int)
                .map_err(|_| binding(kind.to_string(), format!("{} does not fit in int", v)))?,
            (Value::BigInt(v), ValueKind::Float) => Value::Float(v as f64),
            (Value::BigInt(v), ValueKind::Text) => Value::Text(v.to_string()),
            (Value::BigInt(v), ValueKind::Bool) if v == 0 || v == 1 => Value::Bool(v == 1),
            (Value::Float(v), ValueKind::Float) => Value::Float(v),
            (Value::Float(v), ValueKind::Text) => Value::Text(v.to_string()),
            (Value::Bool(v), ValueKind::Bool) => Value::Bool(v),
            (Value::Bool(v), ValueKind::Int) => Value::Int(i32::from(v)),
            (Value::Bool(v), ValueKind::BigInt) => Value::BigInt(i64::from(v)),
            (Value::Timestamp(v), ValueKind::Timestamp) => Value::Timestamp(v),
            (Value::Timestamp(v), ValueKind::Text) => {
                Value::Text(v.format(TIMESTAMP_FORMAT).to_string())
            }
            (other, kind) => {
                return Err(binding(
                    kind.to_string(),
                    format!("cannot convert {:?} to {}", other, kind),
                ))
            }
        };
        Ok(converted)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Rust property types that can be mapped to a column
///
/// `from_value` receives whatever the driver produced for the cell and must
/// accept every lossless representation of `KIND`.
pub trait FieldValue: Sized + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! field_value {
    ($ty:ty, $kind:ident, |$v:ident| $into:expr) => {
        impl FieldValue for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn into_value(self) -> Value {
                let $v = self;
                $into
            }

            fn from_value(value: Value) -> Result<Self> {
                match value.convert(ValueKind::$kind)? {
                    Value::$kind(inner) => Ok(inner.try_into().map_err(|_| {
                        binding(stringify!($ty), "value out of range for property type")
                    })?),
                    other => Err(binding(
                        stringify!($ty),
                        format!("expected {}, got {:?}", ValueKind::$kind, other),
                    )),
                }
            }
        }
    };
}

field_value!(String, Text, |v| Value::Text(v));
field_value!(i32, Int, |v| Value::Int(v));
field_value!(i64, BigInt, |v| Value::BigInt(v));
field_value!(u32, BigInt, |v| Value::BigInt(i64::from(v)));
field_value!(f64, Float, |v| Value::Float(v));
field_value!(bool, Bool, |v| Value::Bool(v));
field_value!(NaiveDateTime, Timestamp, |v| Value::Timestamp(v));

impl FieldValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        // Widen through the shortest decimal form so 0.1f32 stays 0.1
        let widened = self.to_string().parse().unwrap_or_else(|_| f64::from(self));
        Value::Float(widened)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.convert(ValueKind::Float)? {
            Value::Float(v) => Ok(v as f32),
            other => Err(binding("f32", format!("expected float, got {:?}", other))),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
