//! # Wire API
//!
//! JSON-facing entry points used by the editor.
//!
//! - **Validate** checks one expression while it is being typed: static
//!   validation, then a trial evaluation against sample values.
//! - **Resolve** runs a dry-run of a whole definition and reports a preview
//!   together with per-part errors, or a single fatal error.
//!
//! Both have a typed form ([`validate_expression`], [`resolve_request`]) and
//! a string form ([`validate_json`], [`resolve_json`]) that never panics and
//! always answers with JSON.
//!
//! ## Example
//!
//! ```rust
//! use joinery_resolve::api::validate_json;
//!
//! let response = validate_json(r#"{"expression": "L / 0", "scope": "PART"}"#);
//! assert_eq!(response, r#"{"valid":false,"error":"division by zero"}"#);
//! ```

use crate::error::DefinitionError;
use crate::model::{
    EdgebandRules, EdgebandSide, HardwareRule, MaterialEntry, Parameter, PartTemplate,
    ProductDefinition, ProductDims, ResolveInputs, ShapeType,
};
use crate::pipeline::{PartOutcome, ResolvedBom, ResolvedPart, Resolver};
use crate::rules::HardwareRequirement;
use config::constants::{SAMPLE_MATERIAL_THICKNESS, SAMPLE_PARAMETER_VALUE, SAMPLE_PART_DIMENSION};
use joinery_eval::{evaluate, Bindings};
use joinery_expr::scope::{part_identifiers, ScopeSource};
use joinery_expr::{allowed_identifiers, EngineConfig, Expression, Scope};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// =============================================================================
// VALIDATE
// =============================================================================

/// Parameter as known to the editor; the value may not be filled in yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValue {
    pub abbreviation: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Request to check one expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub expression: String,
    #[serde(default)]
    pub scope: Scope,
    /// Sample product dimensions; missing values use a stand-in.
    #[serde(default)]
    pub product_dims: Option<ProductDims>,
    #[serde(default)]
    pub parameters: Vec<ParameterValue>,
    /// Names of the parts of the product being edited.
    #[serde(default)]
    pub parts: Vec<String>,
}

impl ScopeSource for ValidateRequest {
    fn parameter_abbreviations(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .map(|p| p.abbreviation.as_str())
            .collect()
    }

    fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(error: impl ToString) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Checks an expression the way a save would, then evaluates it once with
/// sample values so runtime failures such as division by zero show up early.
/// A blank expression is valid.
pub fn validate_expression(request: &ValidateRequest, config: &EngineConfig) -> ValidateResponse {
    let expression = Expression::new(request.expression.as_str(), request.scope);
    if expression.is_empty() {
        return ValidateResponse::valid();
    }

    let allowed = allowed_identifiers(request.scope, request);
    let ast = match expression.compile(&allowed, config) {
        Ok(ast) => ast,
        Err(error) => return ValidateResponse::invalid(error),
    };

    match evaluate(ast, &sample_bindings(request)) {
        Ok(_) => ValidateResponse::valid(),
        Err(error) => ValidateResponse::invalid(error),
    }
}

/// Every identifier the request could reference, bound to a sample value.
fn sample_bindings(request: &ValidateRequest) -> Bindings {
    let dims = request.product_dims.unwrap_or_else(|| {
        ProductDims::new(
            SAMPLE_PART_DIMENSION,
            SAMPLE_PART_DIMENSION,
            SAMPLE_PART_DIMENSION,
        )
    });

    let mut bindings = Bindings::new();
    for part in &request.parts {
        let [length, width, thickness] = part_identifiers(part);
        bindings.define(&length, SAMPLE_PART_DIMENSION);
        bindings.define(&width, SAMPLE_PART_DIMENSION);
        bindings.define(&thickness, SAMPLE_MATERIAL_THICKNESS);
    }
    for parameter in &request.parameters {
        bindings.define(
            &parameter.abbreviation,
            parameter.value.unwrap_or(SAMPLE_PARAMETER_VALUE),
        );
    }

    // Built-ins last, a colliding part or parameter never shadows them.
    bindings
        .with("product_length", dims.length)
        .with("product_width", dims.width)
        .with("product_height", dims.height)
        .with("quantity", dims.quantity)
        .with("l", dims.length)
        .with("w", dims.width)
        .with("h", dims.height)
        .with("d", dims.width)
        .with("t", SAMPLE_MATERIAL_THICKNESS)
}

/// String form of [`validate_expression`] with default limits.
pub fn validate_json(request: &str) -> String {
    let response = match serde_json::from_str::<ValidateRequest>(request) {
        Ok(request) => validate_expression(&request, &EngineConfig::default()),
        Err(error) => {
            warn!(%error, "malformed validate request");
            ValidateResponse::invalid(format!("malformed request: {error}"))
        }
    };
    to_json(&response)
}

// =============================================================================
// RESOLVE
// =============================================================================

/// Parameter with the value to resolve with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInput {
    pub abbreviation: String,
    pub value: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Hardware rule with plain-text equations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareRuleInput {
    pub hardware_id: String,
    pub quantity_equation: String,
    #[serde(default)]
    pub applicability_condition: Option<String>,
}

impl HardwareRuleInput {
    fn to_rule(&self, scope: Scope) -> HardwareRule {
        let rule = HardwareRule::new(
            self.hardware_id.as_str(),
            Expression::new(self.quantity_equation.as_str(), scope),
        );
        match &self.applicability_condition {
            Some(condition) => rule.when(Expression::new(condition.as_str(), scope)),
            None => rule,
        }
    }
}

/// Part as sent by the editor. Every equation shares `equationScope`; the
/// material expression is always PART scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartTemplateInput {
    pub name: String,
    #[serde(default)]
    pub shape_type: ShapeType,
    #[serde(default)]
    pub length_eq: String,
    #[serde(default)]
    pub width_eq: String,
    #[serde(default)]
    pub qty_eq: String,
    #[serde(default)]
    pub param1_eq: Option<String>,
    #[serde(default)]
    pub param2_eq: Option<String>,
    #[serde(default)]
    pub equation_scope: Scope,
    #[serde(default)]
    pub material_whitelist: Vec<MaterialEntry>,
    #[serde(default)]
    pub material_expression: Option<String>,
    #[serde(default)]
    pub edgebands: EdgebandRules,
    #[serde(default)]
    pub hardware_rules: Vec<HardwareRuleInput>,
}

impl PartTemplateInput {
    fn to_template(&self) -> Result<PartTemplate, DefinitionError> {
        let scope = self.equation_scope;
        let equation = |source: &str| Expression::new(source, scope);

        let mut builder = PartTemplate::builder(self.name.as_str())
            .shape(self.shape_type)
            .length(equation(&self.length_eq))
            .width(equation(&self.width_eq))
            .quantity(equation(&self.qty_eq));
        if let Some(source) = &self.param1_eq {
            builder = builder.param1(equation(source));
        }
        if let Some(source) = &self.param2_eq {
            builder = builder.param2(equation(source));
        }
        for entry in &self.material_whitelist {
            builder = builder.material(entry.material_id.as_str(), entry.thickness_mm);
        }
        if let Some(source) = &self.material_expression {
            builder = builder.material_expression(Expression::part(source.as_str()));
        }
        for side in EdgebandSide::ALL {
            builder = builder.edgeband(side, self.edgebands.side(side).clone());
        }
        for rule in &self.hardware_rules {
            builder = builder.hardware(rule.to_rule(scope));
        }
        builder.build()
    }
}

/// Dry-run request: a definition and the values to resolve it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub product_dims: ProductDims,
    #[serde(default)]
    pub parameters: Vec<ParameterInput>,
    #[serde(default)]
    pub part_templates: Vec<PartTemplateInput>,
    /// Product-level hardware, GLOBAL scope.
    #[serde(default)]
    pub hardware_rules: Vec<HardwareRuleInput>,
    #[serde(default)]
    pub validation_expression: Option<String>,
}

impl ResolveRequest {
    /// Builds the definition, with parameter values as defaults.
    pub fn to_definition(&self) -> Result<(ProductDefinition, ResolveInputs), DefinitionError> {
        let mut builder = ProductDefinition::builder();
        for input in &self.parameters {
            let name = input.name.as_deref().unwrap_or(&input.abbreviation);
            let parameter = Parameter::new(name, input.abbreviation.as_str(), input.value)
                .describe(input.description.as_deref().unwrap_or_default());
            builder = builder.parameter(parameter);
        }
        for part in &self.part_templates {
            builder = builder.part(part.to_template()?);
        }
        for rule in &self.hardware_rules {
            builder = builder.hardware(rule.to_rule(Scope::Global));
        }
        if let Some(source) = &self.validation_expression {
            builder = builder.validation(Expression::global(source.as_str()));
        }
        Ok((builder.build()?, ResolveInputs::new(self.product_dims)))
    }
}

/// A non-fatal error, attributed to a part when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    pub message: String,
}

/// Preview of an accepted configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRun {
    pub preview: Vec<ResolvedPart>,
    pub hardware: Vec<HardwareRequirement>,
    pub errors: Vec<ErrorEntry>,
    pub warnings: Vec<String>,
}

impl From<ResolvedBom> for DryRun {
    fn from(bom: ResolvedBom) -> Self {
        let mut preview = Vec::new();
        let mut errors = Vec::new();

        for outcome in bom.parts {
            match outcome {
                PartOutcome::Resolved(part) => {
                    errors.extend(part.hardware_errors.iter().map(|error| ErrorEntry {
                        part: Some(part.name.clone()),
                        message: error.to_string(),
                    }));
                    preview.push(part);
                }
                PartOutcome::Failed { name, errors: failures } => {
                    errors.extend(failures.iter().map(|error| ErrorEntry {
                        part: Some(name.clone()),
                        message: error.to_string(),
                    }));
                }
            }
        }
        errors.extend(bom.hardware_errors.iter().map(|error| ErrorEntry {
            part: None,
            message: error.to_string(),
        }));

        DryRun {
            preview,
            hardware: bom.hardware,
            errors,
            warnings: bom.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Either a preview or the fatal reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Success(DryRun),
    Failure { error: String },
}

impl ResolveResponse {
    fn failure(error: impl ToString) -> Self {
        ResolveResponse::Failure {
            error: error.to_string(),
        }
    }
}

/// Runs a dry-run of `request`.
pub fn resolve_request(request: &ResolveRequest, config: &EngineConfig) -> ResolveResponse {
    let (product, inputs) = match request.to_definition() {
        Ok(definition) => definition,
        Err(error) => return ResolveResponse::failure(format!("invalid definition: {error}")),
    };

    match Resolver::new(*config).resolve(&product, &inputs) {
        Ok(bom) => {
            debug!(parts = bom.parts.len(), "dry-run accepted");
            ResolveResponse::Success(bom.into())
        }
        Err(errors) => ResolveResponse::failure(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
    }
}

/// String form of [`resolve_request`] with default limits.
pub fn resolve_json(request: &str) -> String {
    let response = match serde_json::from_str::<ResolveRequest>(request) {
        Ok(request) => resolve_request(&request, &EngineConfig::default()),
        Err(error) => {
            warn!(%error, "malformed resolve request");
            ResolveResponse::failure(format!("malformed request: {error}"))
        }
    };
    to_json(&response)
}

fn to_json<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|error| {
        warn!(%error, "response serialization failed");
        serde_json::json!({ "error": error.to_string() }).to_string()
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(expression: &str, scope: Scope) -> ValidateRequest {
        ValidateRequest {
            expression: expression.into(),
            scope,
            product_dims: Some(ProductDims::new(1000.0, 600.0, 800.0)),
            parameters: vec![ParameterValue {
                abbreviation: "SH".into(),
                value: None,
            }],
            parts: vec!["Side Panel".into()],
        }
    }

    #[test]
    fn test_blank_is_valid() {
        let response = validate_expression(&request("   ", Scope::Global), &EngineConfig::default());
        assert!(response.valid);
    }

    #[test]
    fn test_part_reference_in_global_scope() {
        let response = validate_expression(
            &request("side_panel_width - 2 * sh", Scope::Global),
            &EngineConfig::default(),
        );
        assert_eq!(response, ValidateResponse::valid());
    }

    #[test]
    fn test_shorthand_rejected_in_global_scope() {
        let response = validate_expression(&request("L - 36", Scope::Global), &EngineConfig::default());
        assert!(!response.valid);
        assert_eq!(response.error.as_deref(), Some("unknown identifier(s): l"));
    }

    #[test]
    fn test_unset_parameter_does_not_divide_by_zero() {
        let response = validate_expression(&request("W / SH", Scope::Part), &EngineConfig::default());
        assert!(response.valid);
    }

    #[test]
    fn test_malformed_json_answers_with_json() {
        let response: ValidateResponse = serde_json::from_str(&validate_json("{")).unwrap();
        assert!(!response.valid);
        assert!(response.error.unwrap().starts_with("malformed request"));
    }
}
