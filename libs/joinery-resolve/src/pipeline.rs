//! # Resolution Pipeline
//!
//! Turns a [`ProductDefinition`] and concrete [`ResolveInputs`] into a
//! [`ResolvedBom`].
//!
//! ## Stages
//!
//! ```text
//! Pending → PerPartResolving → ValidationCheck → Accepted | Rejected
//! ```
//!
//! Parts resolve in declaration order. A part sees the parts resolved before
//! it through `{part}_length`, `{part}_width` and `{part}_thickness`. A part
//! that fails is reported and the run continues; only malformed inputs and
//! the product validation expression reject the whole run.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::Expression;
//! use joinery_resolve::{resolve, PartTemplate, ProductDefinition, ProductDims, ResolveInputs};
//!
//! let top = PartTemplate::builder("Top")
//!     .length(Expression::global("product_length"))
//!     .width(Expression::global("product_width"))
//!     .material("oak-25", 25.0)
//!     .build()
//!     .unwrap();
//! let product = ProductDefinition::builder().part(top).build().unwrap();
//!
//! let bom = resolve(&product, &ResolveInputs::new(ProductDims::new(1200.0, 600.0, 750.0))).unwrap();
//! let part = bom.resolved_parts().next().unwrap();
//! assert_eq!(part.thickness, Some(25.0));
//! ```

use crate::context::{EvaluationContext, PartBinding, ScopeSets};
use crate::error::{PartError, PipelineError, RuleError, Warning};
use crate::model::{PartTemplate, ProductDefinition, ProductDims, ResolveInputs, ShapeType};
use crate::rules::{
    aggregate_hardware, resolve_edgebands, resolve_hardware, resolve_material, HardwareRequirement,
    SelectedEdgebands,
};
use config::constants::as_whole_number;
use joinery_eval::Bindings;
use joinery_expr::scope::normalize_identifier;
use joinery_expr::{EngineConfig, Expression};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument, warn};

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// A part with every equation evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPart {
    pub name: String,
    pub shape_type: ShapeType,
    pub length: f64,
    pub width: f64,
    /// Thickness of the selected material, `None` without a material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    /// Hardware needed for one piece of this part.
    pub hardware: Vec<HardwareRequirement>,
    pub edgebands: SelectedEdgebands,
    /// Hardware rules whose quantity could not be used.
    #[serde(skip)]
    pub hardware_errors: Vec<RuleError>,
}

/// Result of resolving one part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartOutcome {
    Resolved(ResolvedPart),
    Failed { name: String, errors: Vec<PartError> },
}

impl PartOutcome {
    /// Part name as declared, whether it resolved or not.
    pub fn name(&self) -> &str {
        match self {
            PartOutcome::Resolved(part) => &part.name,
            PartOutcome::Failed { name, .. } => name,
        }
    }

    /// True for [`PartOutcome::Resolved`].
    pub fn is_resolved(&self) -> bool {
        matches!(self, PartOutcome::Resolved(_))
    }
}

/// The bill of parts of an accepted configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBom {
    /// One outcome per part template, in declaration order.
    pub parts: Vec<PartOutcome>,
    /// Total hardware, summed per id in first-appearance order.
    pub hardware: Vec<HardwareRequirement>,
    /// Product-level hardware rules whose quantity could not be used.
    pub hardware_errors: Vec<RuleError>,
    pub warnings: Vec<Warning>,
}

impl ResolvedBom {
    /// Parts that resolved, in declaration order. Failed parts are skipped.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::Expression;
    /// use joinery_resolve::{resolve, PartTemplate, ProductDefinition, ProductDims, ResolveInputs};
    ///
    /// let broken = PartTemplate::builder("Plinth")
    ///     .length(Expression::global("1 / 0"))
    ///     .width(Expression::global("80"))
    ///     .build()
    ///     .unwrap();
    /// let shelf = PartTemplate::builder("Shelf")
    ///     .length(Expression::global("product_length"))
    ///     .width(Expression::global("product_width"))
    ///     .build()
    ///     .unwrap();
    /// let product = ProductDefinition::builder().part(broken).part(shelf).build().unwrap();
    ///
    /// let bom = resolve(&product, &ResolveInputs::new(ProductDims::new(900.0, 400.0, 700.0))).unwrap();
    /// let names: Vec<_> = bom.resolved_parts().map(|p| p.name.as_str()).collect();
    /// assert_eq!(names, ["Shelf"]);
    /// assert_eq!(bom.failed_parts().count(), 1);
    /// ```
    pub fn resolved_parts(&self) -> impl Iterator<Item = &ResolvedPart> {
        self.parts.iter().filter_map(|outcome| match outcome {
            PartOutcome::Resolved(part) => Some(part),
            PartOutcome::Failed { .. } => None,
        })
    }

    /// Failed parts with their errors.
    pub fn failed_parts(&self) -> impl Iterator<Item = (&str, &[PartError])> {
        self.parts.iter().filter_map(|outcome| match outcome {
            PartOutcome::Failed { name, errors } => Some((name.as_str(), errors.as_slice())),
            PartOutcome::Resolved(_) => None,
        })
    }

    /// Outcome of the part called `name`, compared after normalization.
    pub fn part(&self, name: &str) -> Option<&PartOutcome> {
        let wanted = normalize_identifier(name);
        self.parts
            .iter()
            .find(|outcome| normalize_identifier(outcome.name()) == wanted)
    }

    /// Total quantity of one hardware id.
    pub fn hardware_quantity(&self, hardware_id: &str) -> Option<f64> {
        self.hardware
            .iter()
            .find(|line| line.hardware_id == hardware_id)
            .map(|line| line.quantity)
    }
}

// =============================================================================
// RUN STATE
// =============================================================================

/// Stage of a run, reported through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Pending,
    PerPartResolving,
    ValidationCheck,
    Accepted,
    Rejected,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunState::Pending => "pending",
            RunState::PerPartResolving => "per_part_resolving",
            RunState::ValidationCheck => "validation_check",
            RunState::Accepted => "accepted",
            RunState::Rejected => "rejected",
        })
    }
}

fn enter(state: RunState) {
    debug!(state = %state, "resolution state");
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Runs the pipeline under one set of limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    config: EngineConfig,
}

impl Resolver {
    /// Resolver compiling every expression under `config`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::EngineConfig;
    /// use joinery_resolve::Resolver;
    ///
    /// let resolver = Resolver::new(EngineConfig::new(256, 8).unwrap());
    /// assert_eq!(resolver.config().max_ast_depth, 8);
    /// ```
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Limits in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolves one configuration.
    ///
    /// Returns every fatal error found in the inputs, or the single
    /// validation failure, instead of a BOM.
    #[instrument(skip_all, name = "resolve", fields(parts = product.part_templates().len()))]
    pub fn resolve(
        &self,
        product: &ProductDefinition,
        inputs: &ResolveInputs,
    ) -> Result<ResolvedBom, Vec<PipelineError>> {
        enter(RunState::Pending);
        product.check().map_err(|e| vec![PipelineError::from(e)])?;

        let mut warnings = Vec::new();
        let parameter_values = merge_parameters(product, inputs, &mut warnings)?;
        let mut context = EvaluationContext::new(inputs.product_dims, parameter_values);
        let scopes = ScopeSets::new(product, self.config);

        enter(RunState::PerPartResolving);
        let mut parts = Vec::with_capacity(product.part_templates().len());
        for part in product.part_templates() {
            let outcome = self.resolve_part(part, &mut context, &scopes, &mut warnings);
            parts.push(outcome);
        }

        enter(RunState::ValidationCheck);
        if let Some(expression) = product.validation_expression().filter(|e| !e.is_empty()) {
            if let Err(reason) = check_validation(expression, &context.global_bindings(), &scopes) {
                enter(RunState::Rejected);
                warn!(%reason, "configuration rejected");
                return Err(vec![PipelineError::ValidationExpressionFailed { reason }]);
            }
        }

        let product_hardware = resolve_hardware(
            product.hardware_rules(),
            &context.global_bindings(),
            &scopes,
            None,
        );
        warnings.extend(product_hardware.warnings);

        let part_lines = parts.iter().flat_map(|outcome| match outcome {
            PartOutcome::Resolved(part) => part
                .hardware
                .iter()
                .map(|line| HardwareRequirement {
                    hardware_id: line.hardware_id.clone(),
                    quantity: line.quantity * f64::from(part.quantity),
                })
                .collect::<Vec<_>>(),
            PartOutcome::Failed { .. } => Vec::new(),
        });
        let hardware = aggregate_hardware(part_lines.chain(product_hardware.lines));

        enter(RunState::Accepted);
        Ok(ResolvedBom {
            parts,
            hardware,
            hardware_errors: product_hardware.errors,
            warnings,
        })
    }

    /// Resolves independent configurations of one product in parallel.
    /// Results are in input order.
    #[instrument(skip_all, name = "resolve_batch", fields(runs = inputs.len()))]
    pub fn resolve_batch(
        &self,
        product: &ProductDefinition,
        inputs: &[ResolveInputs],
    ) -> Vec<Result<ResolvedBom, Vec<PipelineError>>> {
        inputs
            .par_iter()
            .map(|run| self.resolve(product, run))
            .collect()
    }

    fn resolve_part(
        &self,
        part: &PartTemplate,
        context: &mut EvaluationContext,
        scopes: &ScopeSets,
        warnings: &mut Vec<Warning>,
    ) -> PartOutcome {
        let mut resolved = match resolve_geometry(part, context, scopes, warnings) {
            Ok(resolved) => resolved,
            Err(errors) => {
                warn!(part = part.name(), errors = errors.len(), "part failed");
                return PartOutcome::Failed {
                    name: part.name().to_string(),
                    errors,
                };
            }
        };

        context.register_part(
            part.name(),
            PartBinding {
                length: resolved.length,
                width: resolved.width,
                thickness: resolved.thickness,
            },
        );

        let mut bindings = context.part_bindings();
        if let Some(thickness) = resolved.thickness {
            bindings.define("t", thickness);
        }
        let hardware = resolve_hardware(part.hardware_rules(), &bindings, scopes, Some(part.name()));
        warnings.extend(hardware.warnings);
        resolved.hardware = hardware.lines;
        resolved.hardware_errors = hardware.errors;
        resolved.edgebands = resolve_edgebands(part.edgebands());

        debug!(
            part = part.name(),
            length = resolved.length,
            width = resolved.width,
            quantity = resolved.quantity,
            "part resolved"
        );
        PartOutcome::Resolved(resolved)
    }
}

/// Resolves with default limits.
pub fn resolve(
    product: &ProductDefinition,
    inputs: &ResolveInputs,
) -> Result<ResolvedBom, Vec<PipelineError>> {
    Resolver::default().resolve(product, inputs)
}

// =============================================================================
// INPUT CHECKS
// =============================================================================

fn check_dims(dims: &ProductDims) -> Vec<PipelineError> {
    [
        ("product length", dims.length),
        ("product width", dims.width),
        ("product height", dims.height),
        ("quantity", dims.quantity),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_finite() || *value < 0.0)
    .map(|(name, value)| {
        PipelineError::InvalidInput(format!("{name} must be finite and non-negative, got {value}"))
    })
    .collect()
}

/// Parameter defaults with overrides applied, keyed by lower-cased abbreviation.
fn merge_parameters(
    product: &ProductDefinition,
    inputs: &ResolveInputs,
    warnings: &mut Vec<Warning>,
) -> Result<BTreeMap<String, f64>, Vec<PipelineError>> {
    let mut errors = check_dims(&inputs.product_dims);
    let mut values = product.default_parameter_values();

    for (abbreviation, value) in &inputs.parameter_overrides {
        let key = normalize_identifier(abbreviation);
        if !values.contains_key(&key) {
            warn!(abbreviation = %abbreviation, "unknown parameter override");
            warnings.push(Warning::UnknownParameter {
                abbreviation: abbreviation.clone(),
            });
            continue;
        }
        if !value.is_finite() {
            errors.push(PipelineError::InvalidInput(format!(
                "parameter '{abbreviation}' must be finite, got {value}"
            )));
            continue;
        }
        values.insert(key, *value);
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        enter(RunState::Rejected);
        Err(errors)
    }
}

fn check_validation(
    expression: &Expression,
    bindings: &Bindings,
    scopes: &ScopeSets,
) -> Result<(), String> {
    match scopes.boolean(expression, bindings) {
        Ok(true) => Ok(()),
        Ok(false) => Err(format!("'{}' is false", expression.source())),
        Err(error) => Err(error.to_string()),
    }
}

// =============================================================================
// PART GEOMETRY
// =============================================================================

/// Material and geometry of one part. Every failing field is reported.
fn resolve_geometry(
    part: &PartTemplate,
    context: &EvaluationContext,
    scopes: &ScopeSets,
    warnings: &mut Vec<Warning>,
) -> Result<ResolvedPart, Vec<PartError>> {
    let mut errors = Vec::new();
    let mut bindings = context.part_bindings();

    let mut material = None;
    if !part.material_whitelist().is_empty() {
        match resolve_material(part, &bindings, scopes) {
            Ok(selection) => {
                warnings.extend(selection.warnings.iter().cloned());
                bindings.define("t", selection.thickness_mm);
                material = Some(selection);
            }
            Err(error) => errors.push(PartError::from(error)),
        }
    }

    let geometry = part.geometry();
    let length = dimension("lengthEq", geometry.length.as_ref(), &bindings, scopes);
    let width = dimension("widthEq", geometry.width.as_ref(), &bindings, scopes);
    let quantity = piece_count(geometry.quantity.as_ref(), &bindings, scopes);

    let extra = part.shape_type().extra_parameters();
    let param1 = shape_parameter("param1Eq", geometry.param1.as_ref(), extra >= 1, &bindings, scopes);
    let param2 = shape_parameter("param2Eq", geometry.param2.as_ref(), extra >= 2, &bindings, scopes);

    let (length, width, quantity, param1, param2) = match (length, width, quantity, param1, param2) {
        (Ok(l), Ok(w), Ok(q), Ok(p1), Ok(p2)) if errors.is_empty() => (l, w, q, p1, p2),
        (l, w, q, p1, p2) => {
            errors.extend(l.err());
            errors.extend(w.err());
            errors.extend(q.err());
            errors.extend(p1.err());
            errors.extend(p2.err());
            return Err(errors);
        }
    };

    let (material_id, thickness) = match material {
        Some(selection) => (Some(selection.material_id), Some(selection.thickness_mm)),
        None => (None, None),
    };

    Ok(ResolvedPart {
        name: part.name().to_string(),
        shape_type: part.shape_type(),
        length,
        width,
        thickness,
        quantity,
        param1,
        param2,
        material_id,
        hardware: Vec::new(),
        edgebands: SelectedEdgebands::new(),
        hardware_errors: Vec::new(),
    })
}

/// Evaluates an equation, `None` when it is missing or blank.
fn evaluate_field(
    field: &'static str,
    equation: Option<&Expression>,
    bindings: &Bindings,
    scopes: &ScopeSets,
) -> Result<Option<f64>, PartError> {
    match equation.filter(|e| !e.is_empty()) {
        None => Ok(None),
        Some(expression) => scopes
            .number(expression, bindings)
            .map(Some)
            .map_err(|source| PartError::Equation { field, source }),
    }
}

fn dimension(
    field: &'static str,
    equation: Option<&Expression>,
    bindings: &Bindings,
    scopes: &ScopeSets,
) -> Result<f64, PartError> {
    let value = evaluate_field(field, equation, bindings, scopes)?
        .ok_or(PartError::MissingEquation { field })?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PartError::InvalidDimension { field, value })
    }
}

/// Blank quantity means one piece.
fn piece_count(
    equation: Option<&Expression>,
    bindings: &Bindings,
    scopes: &ScopeSets,
) -> Result<u32, PartError> {
    let value = evaluate_field("qtyEq", equation, bindings, scopes)?.unwrap_or(1.0);
    match as_whole_number(value) {
        Some(whole) if whole >= 0.0 && whole <= f64::from(u32::MAX) => Ok(whole as u32),
        _ => Err(PartError::InvalidPartQuantity { value }),
    }
}

/// Shape parameters are only evaluated when the shape uses them.
fn shape_parameter(
    field: &'static str,
    equation: Option<&Expression>,
    required: bool,
    bindings: &Bindings,
    scopes: &ScopeSets,
) -> Result<Option<f64>, PartError> {
    if !required {
        return Ok(None);
    }
    match evaluate_field(field, equation, bindings, scopes)? {
        None => Err(PartError::MissingEquation { field }),
        Some(value) if value.is_finite() => Ok(Some(value)),
        Some(value) => Err(PartError::InvalidDimension { field, value }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
