//! Wire type inference
//!
//! Backends accept three bindable shapes. Anything else has no wire type and
//! must be rejected before execution.

use crate::types::Value;
use std::fmt;

/// Type tag sent alongside a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    String,
    Integer,
    Float,
}

impl WireType {
    /// Infer the wire type of a value; `None` means the value is unbindable
    pub fn of(value: &Value) -> Option<WireType> {
        match value {
            Value::Text(_) => Some(WireType::String),
            Value::Integer(_) => Some(WireType::Integer),
            Value::Float(_) => Some(WireType::Float),
            _ => None,
        }
    }

    /// Single-character code (`s`, `i`, `d`) as used by mysqli-style type strings
    pub fn code(&self) -> char {
        match self {
            WireType::String => 's',
            WireType::Integer => 'i',
            WireType::Float => 'd',
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::String => "string",
            WireType::Integer => "integer",
            WireType::Float => "float",
        };
        write!(f, "{}", name)
    }
}
