//! # Definition Lint
//!
//! Compiles every expression of a product against its declared scope without
//! evaluating anything, so an editor can flag broken equations before a
//! configuration is ever resolved.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::{EngineConfig, Expression};
//! use joinery_resolve::lint::{lint_product, LintProblem};
//! use joinery_resolve::{PartTemplate, ProductDefinition};
//!
//! let shelf = PartTemplate::builder("Shelf")
//!     .length(Expression::global("product_lenght - 36"))
//!     .width(Expression::global("product_width"))
//!     .build()
//!     .unwrap();
//! let product = ProductDefinition::builder().part(shelf).build().unwrap();
//!
//! let issues = lint_product(&product, &EngineConfig::default());
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].location, "part 'Shelf' lengthEq");
//! assert!(matches!(issues[0].problem, LintProblem::Compile(_)));
//! ```

use crate::model::{HardwareRule, PartTemplate, ProductDefinition};
use joinery_expr::{allowed_identifiers, CompileError, EngineConfig, Expression, IdentifierSet, Scope};
use std::fmt;
use thiserror::Error;

/// What is wrong with one expression slot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LintProblem {
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A required equation is blank or missing.
    #[error("equation is missing")]
    MissingEquation,
}

/// One finding, with a human-readable location.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionIssue {
    pub location: String,
    pub problem: LintProblem,
}

impl fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.problem)
    }
}

/// Lists every issue in declaration order. An empty list means every
/// expression compiles.
pub fn lint_product(product: &ProductDefinition, config: &EngineConfig) -> Vec<DefinitionIssue> {
    let linter = Linter {
        global: allowed_identifiers(Scope::Global, product),
        part: allowed_identifiers(Scope::Part, product),
        config,
        issues: Vec::new(),
    };
    linter.run(product)
}

struct Linter<'a> {
    global: IdentifierSet,
    part: IdentifierSet,
    config: &'a EngineConfig,
    issues: Vec<DefinitionIssue>,
}

impl Linter<'_> {
    fn run(mut self, product: &ProductDefinition) -> Vec<DefinitionIssue> {
        for part in product.part_templates() {
            self.part_template(part);
        }
        self.hardware("product", product.hardware_rules());
        self.optional("validationExpression".to_string(), product.validation_expression());
        self.issues
    }

    fn part_template(&mut self, part: &PartTemplate) {
        let owner = format!("part '{}'", part.name());
        let geometry = part.geometry();
        let extra = part.shape_type().extra_parameters();

        self.required(format!("{owner} lengthEq"), geometry.length.as_ref());
        self.required(format!("{owner} widthEq"), geometry.width.as_ref());
        self.optional(format!("{owner} qtyEq"), geometry.quantity.as_ref());
        if extra >= 1 {
            self.required(format!("{owner} param1Eq"), geometry.param1.as_ref());
        }
        if extra >= 2 {
            self.required(format!("{owner} param2Eq"), geometry.param2.as_ref());
        }
        self.optional(format!("{owner} materialExpression"), part.material_expression());
        self.hardware(&owner, part.hardware_rules());
    }

    fn hardware(&mut self, owner: &str, rules: &[HardwareRule]) {
        for rule in rules {
            let location = format!("{owner} hardware '{}'", rule.hardware_id);
            self.required(format!("{location} quantityEquation"), Some(&rule.quantity));
            self.optional(
                format!("{location} applicabilityCondition"),
                rule.condition.as_ref(),
            );
        }
    }

    fn required(&mut self, location: String, expression: Option<&Expression>) {
        match expression.filter(|e| !e.is_empty()) {
            Some(expression) => self.compile(location, expression),
            None => self.issues.push(DefinitionIssue {
                location,
                problem: LintProblem::MissingEquation,
            }),
        }
    }

    fn optional(&mut self, location: String, expression: Option<&Expression>) {
        if let Some(expression) = expression.filter(|e| !e.is_empty()) {
            self.compile(location, expression);
        }
    }

    fn compile(&mut self, location: String, expression: &Expression) {
        let allowed = match expression.scope() {
            Scope::Global => &self.global,
            Scope::Part => &self.part,
        };
        if let Err(error) = expression.compile(allowed, self.config) {
            self.issues.push(DefinitionIssue {
                location,
                problem: error.into(),
            });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeType;
    use joinery_expr::Violation;

    #[test]
    fn test_clean_product() {
        let part = PartTemplate::builder("Side")
            .length(Expression::part("H"))
            .width(Expression::part("D"))
            .material_expression(Expression::part("T >= 16"))
            .hardware(
                HardwareRule::new("cam", Expression::global("4"))
                    .when(Expression::global("side_length > 600")),
            )
            .build()
            .unwrap();
        let product = ProductDefinition::builder()
            .part(part)
            .validation(Expression::global("product_height <= 2400"))
            .build()
            .unwrap();
        assert!(lint_product(&product, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_scope_mismatch_is_reported() {
        // Shorthand is not visible in GLOBAL scope.
        let part = PartTemplate::builder("Side")
            .length(Expression::global("H"))
            .width(Expression::part("D"))
            .build()
            .unwrap();
        let product = ProductDefinition::builder().part(part).build().unwrap();
        let issues = lint_product(&product, &EngineConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].problem,
            LintProblem::Compile(CompileError::Violations(vec![
                Violation::UnknownIdentifiers(vec!["h".into()])
            ]))
        );
    }

    #[test]
    fn test_missing_shape_parameters() {
        let part = PartTemplate::builder("Worktop")
            .shape(ShapeType::LShape)
            .length(Expression::global("product_length"))
            .width(Expression::global("product_width"))
            .param1(Expression::global("300"))
            .build()
            .unwrap();
        let product = ProductDefinition::builder().part(part).build().unwrap();
        let issues = lint_product(&product, &EngineConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "part 'Worktop' param2Eq: equation is missing");
    }

    #[test]
    fn test_limits_apply() {
        let config = EngineConfig::new(16, 8).unwrap();
        let product = ProductDefinition::builder()
            .validation(Expression::global("product_length + product_width > 0"))
            .build()
            .unwrap();
        let issues = lint_product(&product, &config);
        assert!(matches!(
            issues[0].problem,
            LintProblem::Compile(CompileError::Limit(_))
        ));
    }
}
