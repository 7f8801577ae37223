//! # Configuration Constants
//!
//! Centralized constants for the configuration engine. Expression limits,
//! numeric tolerances and the sample values used when an expression is
//! checked interactively are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Limits**: Hard caps on expression size and nesting
//! - **Samples**: Stand-in values for interactive validation
//! - **Runtime**: `EngineConfig`, the per-call limit snapshot

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Used by `==` / `!=` in expressions and when checking that an evaluated
/// part quantity is a whole number.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-9;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Hard cap on the length of an expression source, in characters.
///
/// Parsing rejects longer input before tokenizing it.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_EXPRESSION_LENGTH;
///
/// let source = "product_length / 2";
/// assert!(source.chars().count() <= MAX_EXPRESSION_LENGTH);
/// ```
pub const MAX_EXPRESSION_LENGTH: usize = 4096;

/// Hard cap on the nesting depth of a parsed expression.
///
/// Each parenthesized group, unary operator and function call adds one
/// level. Chains of binary operators do not, `1 + 2 + 3` has depth zero.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_AST_DEPTH;
///
/// assert!(MAX_AST_DEPTH >= 32);
/// ```
pub const MAX_AST_DEPTH: usize = 128;

/// Default per-call limit on expression length.
pub const DEFAULT_MAX_EXPRESSION_LENGTH: usize = 1024;

/// Default per-call limit on expression nesting depth.
pub const DEFAULT_MAX_AST_DEPTH: usize = 48;

/// Bytes of stack space reserved when growing recursion limits using the
/// `stacker` crate.
///
/// # Examples
/// ```
/// use config::constants::STACKER_STACK_SIZE_BYTES;
/// assert!(STACKER_STACK_SIZE_BYTES >= 1024);
/// ```
pub const STACKER_STACK_SIZE_BYTES: usize = 8 * 1024 * 1024;

/// Remaining stack below which `stacker` allocates a new segment.
pub const STACKER_RED_ZONE_BYTES: usize = 64 * 1024;

// =============================================================================
// SAMPLE CONSTANTS
// =============================================================================

/// Stand-in length/width bound to `{part}_length` and `{part}_width` when an
/// expression is checked before any part has been resolved.
///
/// # Example
///
/// ```rust
/// use config::constants::SAMPLE_PART_DIMENSION;
///
/// assert!(SAMPLE_PART_DIMENSION > 0.0);
/// ```
pub const SAMPLE_PART_DIMENSION: f64 = 100.0;

/// Stand-in thickness bound to `T` and `{part}_thickness` during interactive
/// validation. 18 mm is the most common carcass board.
pub const SAMPLE_MATERIAL_THICKNESS: f64 = 18.0;

/// Stand-in for a parameter whose value is not supplied to a validate call.
/// Non-zero so that dividing by an unset parameter is not flagged.
pub const SAMPLE_PARAMETER_VALUE: f64 = 1.0;

/// Product quantity assumed when a request does not specify one.
pub const DEFAULT_PRODUCT_QUANTITY: f64 = 1.0;

// =============================================================================
// RUNTIME CONFIGURATION
// =============================================================================

/// Immutable snapshot of the limits applied to one engine call.
///
/// # Examples
/// ```
/// use config::constants::EngineConfig;
/// let config = EngineConfig::default();
/// assert!(config.max_expression_length > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Maximum characters accepted in one expression source.
    pub max_expression_length: usize,
    /// Maximum nesting depth accepted in one parsed expression.
    pub max_ast_depth: usize,
}

impl EngineConfig {
    /// Builds a configuration, rejecting zero limits and limits above the
    /// hard caps.
    ///
    /// # Examples
    /// ```
    /// use config::constants::EngineConfig;
    /// let cfg = EngineConfig::new(256, 16).expect("valid config");
    /// assert_eq!(cfg.max_ast_depth, 16);
    /// ```
    pub fn new(max_expression_length: usize, max_ast_depth: usize) -> Result<Self, ConfigError> {
        Self {
            max_expression_length,
            max_ast_depth,
        }
        .checked()
    }

    /// Re-validates a configuration, e.g. one obtained through serde.
    pub fn checked(self) -> Result<Self, ConfigError> {
        if self.max_expression_length == 0 || self.max_expression_length > MAX_EXPRESSION_LENGTH {
            return Err(ConfigError::InvalidExpressionLength(self.max_expression_length));
        }
        if self.max_ast_depth == 0 || self.max_ast_depth > MAX_AST_DEPTH {
            return Err(ConfigError::InvalidAstDepth(self.max_ast_depth));
        }
        Ok(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_expression_length: DEFAULT_MAX_EXPRESSION_LENGTH,
            max_ast_depth: DEFAULT_MAX_AST_DEPTH,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Raised when the expression length limit is zero or above the hard cap.
    #[error("max_expression_length must be between 1 and the hard cap: {0}")]
    InvalidExpressionLength(usize),
    /// Raised when the depth limit is zero or above the hard cap.
    #[error("max_ast_depth must be between 1 and the hard cap: {0}")]
    InvalidAstDepth(usize),
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two f64 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Returns the nearest whole number when `value` is one within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::as_whole_number;
///
/// assert_eq!(as_whole_number(4.0000000001), Some(4.0));
/// assert_eq!(as_whole_number(4.5), None);
/// ```
#[inline]
pub fn as_whole_number(value: f64) -> Option<f64> {
    let rounded = value.round();
    (value.is_finite() && approx_equal(value, rounded)).then_some(rounded)
}
