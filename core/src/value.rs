//! Tagged parameter values produced by coercion.
//!
//! # Design
//! Caller arguments arrive as dynamically typed JSON scalars. Rather than
//! threading `serde_json::Value` through the whole pipeline, the binder
//! coerces each argument against its declared manifest type exactly once and
//! the rest of the engine only ever sees a `Value`. Dynamic-typing risk is
//! confined to this one boundary.

use crate::manifest::ParamType;

/// A validated, typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Bool(bool),
    String(String),
}

impl Value {
    /// Coerce a dynamic JSON scalar to the declared type.
    ///
    /// Rules:
    /// - `integer`: JSON whole numbers (including `5.0`) and integer strings.
    /// - `number`: any JSON number, or a string parseable as one.
    /// - `boolean`: JSON booleans, or the strings `"true"` / `"false"`.
    /// - `string`: any scalar, rendered as text.
    ///
    /// Nulls, arrays, and objects never coerce. Returns `None` on failure;
    /// the binder turns that into a `TypeMismatch` with full context.
    pub fn coerce(ty: ParamType, raw: &serde_json::Value) -> Option<Value> {
        match ty {
            ParamType::Integer => match raw {
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Some(Value::Integer(i))
                    } else {
                        // Accept floats that are exactly whole.
                        n.as_f64()
                            .filter(|f| f.fract() == 0.0 && f.is_finite())
                            .map(|f| Value::Integer(f as i64))
                    }
                }
                serde_json::Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Integer),
                _ => None,
            },
            ParamType::Number => match raw {
                serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Number),
                _ => None,
            },
            ParamType::Boolean => match raw {
                serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
                serde_json::Value::String(s) => match s.as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ParamType::String => match raw {
                serde_json::Value::String(s) => Some(Value::String(s.clone())),
                serde_json::Value::Number(n) => Some(Value::String(n.to_string())),
                serde_json::Value::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
        }
    }

    /// Canonical textual form used for path segments and query values.
    pub fn render(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
        }
    }

    /// Typed JSON form used when serializing body payloads.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Number(n) => serde_json::Value::from(*n),
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::String(s) => serde_json::Value::from(s.as_str()),
        }
    }
}
