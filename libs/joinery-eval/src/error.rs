//! # Evaluation Errors
//!
//! Error types for AST evaluation.

use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "camelCase")]
pub enum EvalError {
    /// `/` with a zero divisor, or `round` with zero precision.
    #[error("division by zero")]
    DivisionByZero,

    /// Operand or result of the wrong type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    /// Identifier with no binding.
    #[error("unbound identifier: {name}")]
    UnboundIdentifier { name: String },

    /// Call whose argument count does not match the function.
    #[error("{function} expects {expected} argument(s), got {found}")]
    WrongArity {
        function: String,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================
