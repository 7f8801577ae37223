//! # Resolution Errors
//!
//! Error types for definitions, rule resolution and the pipeline.
//!
//! Severity follows the error type:
//!
//! - [`DefinitionError`] and [`PipelineError`] reject a whole run
//! - [`PartError`] fails one part, the rest of the run continues
//! - [`RuleError`] from hardware rules omits one hardware line
//! - [`Warning`] is informational

use joinery_eval::EvalError;
use joinery_expr::CompileError;
use thiserror::Error;

// =============================================================================
// DEFINITION ERRORS
// =============================================================================

/// A product or part definition breaks an invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    /// Part name is blank.
    #[error("part name must not be empty")]
    EmptyPartName,

    /// Normalized part name is not usable in `{part}_length` identifiers.
    #[error("part name '{0}' does not normalize to an identifier")]
    InvalidPartName(String),

    /// A `{part}_length`, `{part}_width` or `{part}_thickness` identifier of
    /// this part would shadow a keyword, function or built-in identifier.
    #[error("part name '{0}' collides with a built-in identifier")]
    ReservedPartName(String),

    /// Two parts normalize to the same name.
    #[error("duplicate part name '{0}'")]
    DuplicatePartName(String),

    /// Abbreviation does not match the identifier grammar.
    #[error("parameter abbreviation '{0}' is not an identifier")]
    InvalidAbbreviation(String),

    /// Abbreviation declared twice (case-insensitive).
    #[error("duplicate parameter abbreviation '{0}'")]
    DuplicateAbbreviation(String),

    /// Abbreviation would shadow a keyword, function or built-in identifier.
    #[error("parameter abbreviation '{0}' is reserved")]
    ReservedAbbreviation(String),

    /// Parameter default is NaN or infinite.
    #[error("parameter '{0}' has a non-finite default value")]
    InvalidDefault(String),

    /// Material entry with a blank id or a thickness that is not positive.
    #[error("part '{part}': invalid material entry '{material_id}'")]
    InvalidMaterial { part: String, material_id: String },
}

// =============================================================================
// EXPRESSION ERRORS
// =============================================================================

/// An expression failed to compile or to evaluate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

// =============================================================================
// RULE ERRORS
// =============================================================================

/// Failures of material and hardware rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// No whitelist entry passed the material condition.
    #[error("no applicable material for part '{0}'")]
    NoApplicableMaterial(String),

    /// The material condition itself does not compile.
    #[error("material expression: {0}")]
    MaterialExpression(ExpressionError),

    /// Quantity evaluated to a negative or non-finite number.
    #[error("hardware '{hardware_id}': invalid quantity {value}")]
    InvalidQuantity { hardware_id: String, value: f64 },

    /// Quantity equation failed to compile or evaluate.
    #[error("hardware '{hardware_id}': quantity equation failed: {source}")]
    HardwareQuantityFailed {
        hardware_id: String,
        #[source]
        source: ExpressionError,
    },
}

// =============================================================================
// PART ERRORS
// =============================================================================

/// Why a single part could not be resolved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartError {
    /// A geometry equation failed.
    #[error("{field}: {source}")]
    Equation {
        field: &'static str,
        #[source]
        source: ExpressionError,
    },

    /// A required equation is blank or missing.
    #[error("{field} equation is missing")]
    MissingEquation { field: &'static str },

    /// A dimension is negative or non-finite.
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidDimension { field: &'static str, value: f64 },

    /// Part quantity is not a non-negative whole number.
    #[error("quantity must be a non-negative whole number, got {value}")]
    InvalidPartQuantity { value: f64 },

    #[error(transparent)]
    Rule(#[from] RuleError),
}

// =============================================================================
// PIPELINE ERRORS
// =============================================================================

/// Errors that reject a whole resolution run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Product dimensions or overrides are unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    /// The product-level gate evaluated to false or failed.
    #[error("validation expression failed: {reason}")]
    ValidationExpressionFailed { reason: String },
}

// =============================================================================
// WARNINGS
// =============================================================================

/// Non-fatal observations collected during a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    /// Override for an abbreviation the product does not declare.
    #[error("unknown parameter override '{abbreviation}' ignored")]
    UnknownParameter { abbreviation: String },

    /// Material condition failed for one entry, which was excluded.
    #[error("part '{part}': material '{material_id}' excluded: {reason}")]
    MaterialConditionFailed {
        part: String,
        material_id: String,
        reason: String,
    },

    /// Hardware applicability condition failed, the rule was excluded.
    #[error("{}hardware '{hardware_id}' excluded: {reason}", owner_prefix(.part))]
    HardwareConditionFailed {
        part: Option<String>,
        hardware_id: String,
        reason: String,
    },
}

fn owner_prefix(part: &Option<String>) -> String {
    part.as_ref()
        .map(|p| format!("part '{p}': "))
        .unwrap_or_default()
}

// =============================================================================
// TESTS
// =============================================================================
