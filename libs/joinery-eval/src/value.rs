//! # Runtime Values
//!
//! The expression language has exactly two types, IEEE doubles and
//! booleans, and never converts between them.
//!
//! ## Example
//!
//! ```rust
//! use joinery_eval::{Value, ValueType};
//!
//! let t = Value::from(18.0);
//! assert_eq!(t.value_type(), ValueType::Number);
//! assert_eq!(t.as_bool(), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// VALUE
// =============================================================================

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Boolean(bool),
}

/// Type tag of a [`Value`], used in type mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Boolean,
}

impl Value {
    /// Type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }

    /// The number, if this is one. Booleans never convert.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(_) => None,
        }
    }

    /// The boolean, if this is one. Numbers are never truthy.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Number(_) => None,
        }
    }
}

// =============================================================================
// CONVERSIONS & DISPLAY
// =============================================================================

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Number => f.write_str("number"),
            ValueType::Boolean => f.write_str("boolean"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_implicit_conversions() {
        assert_eq!(Value::Boolean(true).as_f64(), None);
        assert_eq!(Value::Number(1.0).as_bool(), None);
    }

    #[test]
    fn test_serializes_as_plain_json() {
        assert_eq!(serde_json::to_string(&Value::Number(18.0)).unwrap(), "18.0");
        assert_eq!(serde_json::to_string(&Value::Boolean(false)).unwrap(), "false");
    }
}
