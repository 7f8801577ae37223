//! # Evaluation Context
//!
//! Concrete values for one resolution run, and the identifier sets every
//! expression is compiled against before it is evaluated.

use crate::error::ExpressionError;
use crate::model::{ProductDefinition, ProductDims};
use joinery_eval::{evaluate, evaluate_bool, evaluate_number, Bindings, Value};
use joinery_expr::scope::{normalize_part_name, PART_SUFFIXES};
use joinery_expr::{allowed_identifiers, Ast, EngineConfig, Expression, IdentifierSet, Scope};
use std::collections::BTreeMap;

// =============================================================================
// SCOPE SETS
// =============================================================================

/// Allowed identifiers of both scopes plus the limits, computed once per run.
#[derive(Debug, Clone)]
pub struct ScopeSets {
    global: IdentifierSet,
    part: IdentifierSet,
    config: EngineConfig,
}

impl ScopeSets {
    /// Allowed identifiers of `product` in both scopes.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::{EngineConfig, Expression, Scope};
    /// use joinery_resolve::{Parameter, PartTemplate, ProductDefinition, ScopeSets};
    ///
    /// let back = PartTemplate::builder("Back").build().unwrap();
    /// let product = ProductDefinition::builder()
    ///     .parameter(Parameter::new("Gap", "GAP", 2.0))
    ///     .part(back)
    ///     .build()
    ///     .unwrap();
    /// let scopes = ScopeSets::new(&product, EngineConfig::default());
    ///
    /// assert!(scopes.allowed(Scope::Global).contains("back_width"));
    /// assert!(!scopes.allowed(Scope::Part).contains("back_width"));
    /// assert!(scopes.compile(&Expression::part("L - GAP")).is_ok());
    /// ```
    pub fn new(product: &ProductDefinition, config: EngineConfig) -> Self {
        Self {
            global: allowed_identifiers(Scope::Global, product),
            part: allowed_identifiers(Scope::Part, product),
            config,
        }
    }

    /// Identifiers allowed in `scope`.
    pub fn allowed(&self, scope: Scope) -> &IdentifierSet {
        match scope {
            Scope::Global => &self.global,
            Scope::Part => &self.part,
        }
    }

    /// Compile against the expression's declared scope.
    pub fn compile<'e>(&self, expression: &'e Expression) -> Result<&'e Ast, ExpressionError> {
        Ok(expression.compile(self.allowed(expression.scope()), &self.config)?)
    }

    /// Compile, then evaluate to any value.
    pub fn evaluate(&self, expression: &Expression, bindings: &Bindings) -> Result<Value, ExpressionError> {
        Ok(evaluate(self.compile(expression)?, bindings)?)
    }

    /// Compile, then evaluate to a number.
    pub fn number(&self, expression: &Expression, bindings: &Bindings) -> Result<f64, ExpressionError> {
        Ok(evaluate_number(self.compile(expression)?, bindings)?)
    }

    /// Compile, then evaluate to a boolean.
    pub fn boolean(&self, expression: &Expression, bindings: &Bindings) -> Result<bool, ExpressionError> {
        Ok(evaluate_bool(self.compile(expression)?, bindings)?)
    }
}

// =============================================================================
// EVALUATION CONTEXT
// =============================================================================

/// Resolved dimensions of a part, visible to later parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartBinding {
    pub length: f64,
    pub width: f64,
    pub thickness: Option<f64>,
}

/// Bindings for one run. Parts are registered as they resolve, so a part
/// sees only the parts declared before it.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    product_dims: ProductDims,
    parameter_values: BTreeMap<String, f64>,
    part_bindings: Vec<(String, PartBinding)>,
}

impl EvaluationContext {
    /// `parameter_values` must be keyed by lower-cased abbreviation.
    pub fn new(product_dims: ProductDims, parameter_values: BTreeMap<String, f64>) -> Self {
        Self {
            product_dims,
            parameter_values,
            part_bindings: Vec::new(),
        }
    }

    /// Dimensions of the run.
    pub fn product_dims(&self) -> &ProductDims {
        &self.product_dims
    }

    /// Effective parameter values, overrides applied.
    pub fn parameter_values(&self) -> &BTreeMap<String, f64> {
        &self.parameter_values
    }

    /// Make `{part}_length`, `{part}_width` and `{part}_thickness` available.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_eval::Value;
    /// use joinery_resolve::{EvaluationContext, PartBinding, ProductDims};
    ///
    /// let mut ctx = EvaluationContext::new(ProductDims::new(1000.0, 600.0, 800.0), Default::default());
    /// ctx.register_part("Side Panel", PartBinding { length: 800.0, width: 600.0, thickness: Some(18.0) });
    ///
    /// let bindings = ctx.global_bindings();
    /// assert_eq!(bindings.get("side_panel_thickness"), Some(Value::Number(18.0)));
    /// ```
    pub fn register_part(&mut self, name: &str, binding: PartBinding) {
        self.part_bindings.push((normalize_part_name(name), binding));
    }

    /// Product identifiers, parameters and resolved parts.
    ///
    /// Built-ins are defined last, so they win over any name that collides.
    pub fn global_bindings(&self) -> Bindings {
        let mut bindings = Bindings::new();
        for (name, part) in &self.part_bindings {
            let [length, width, thickness] = PART_SUFFIXES;
            bindings.define(&format!("{name}_{length}"), part.length);
            bindings.define(&format!("{name}_{width}"), part.width);
            if let Some(t) = part.thickness {
                bindings.define(&format!("{name}_{thickness}"), t);
            }
        }

        bindings.extend(self.parameter_values.iter().map(|(k, v)| (k.as_str(), *v)));

        let dims = &self.product_dims;
        bindings
            .with("product_length", dims.length)
            .with("product_width", dims.width)
            .with("product_height", dims.height)
            .with("quantity", dims.quantity)
    }

    /// Global bindings plus the local shorthand `L`, `W`, `H`, `D`.
    ///
    /// `T` depends on the selected material and is bound by the caller.
    pub fn part_bindings(&self) -> Bindings {
        let dims = &self.product_dims;
        self.global_bindings()
            .with("l", dims.length)
            .with("w", dims.width)
            .with("h", dims.height)
            .with("d", dims.width)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EvaluationContext {
        let params = [("sh".to_string(), 18.0)].into_iter().collect();
        EvaluationContext::new(ProductDims::new(1000.0, 600.0, 800.0), params)
    }

    #[test]
    fn test_global_bindings() {
        let bindings = context().global_bindings();
        assert_eq!(bindings.get("product_width"), Some(Value::Number(600.0)));
        assert_eq!(bindings.get("SH"), Some(Value::Number(18.0)));
        assert_eq!(bindings.get("quantity"), Some(Value::Number(1.0)));
        assert!(!bindings.contains("l"));
    }

    #[test]
    fn test_shorthand_depth_is_width() {
        let bindings = context().part_bindings();
        assert_eq!(bindings.get("D"), bindings.get("W"));
        assert!(!bindings.contains("t"));
    }

    #[test]
    fn test_registered_parts() {
        let mut ctx = context();
        ctx.register_part(
            "Side Panel",
            PartBinding {
                length: 800.0,
                width: 600.0,
                thickness: Some(18.0),
            },
        );
        ctx.register_part(
            "Back",
            PartBinding {
                length: 800.0,
                width: 964.0,
                thickness: None,
            },
        );
        let bindings = ctx.global_bindings();
        assert_eq!(bindings.get("side_panel_thickness"), Some(Value::Number(18.0)));
        assert_eq!(bindings.get("back_width"), Some(Value::Number(964.0)));
        assert!(!bindings.contains("back_thickness"));
    }

    #[test]
    fn test_builtins_win_over_colliding_parts() {
        let mut ctx = context();
        ctx.register_part(
            "Product",
            PartBinding {
                length: 100.0,
                width: 50.0,
                thickness: None,
            },
        );
        let bindings = ctx.part_bindings();
        assert_eq!(bindings.get("product_length"), Some(Value::Number(1000.0)));
        assert_eq!(bindings.get("product_width"), Some(Value::Number(600.0)));
    }
}
