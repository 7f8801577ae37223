//! # Rule Resolution
//!
//! Conditional selection of materials, hardware and edge bands.
//!
//! ## Material
//!
//! Every whitelist entry is a candidate. When the part has a material
//! expression, it is evaluated once per entry with `T` bound to that entry's
//! thickness, and only entries for which it is true stay candidates. The
//! thickest candidate wins; on equal thickness the first declared wins.
//!
//! ## Hardware
//!
//! A rule whose applicability condition is false or fails is skipped. A
//! failing condition becomes a warning. The quantity of an applicable rule
//! must evaluate to a finite, non-negative number; otherwise the line is
//! omitted and an error is recorded.

use crate::context::ScopeSets;
use crate::error::{ExpressionError, RuleError, Warning};
use crate::model::{EdgebandRules, EdgebandSide, HardwareRule, PartTemplate};
use joinery_eval::Bindings;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

// =============================================================================
// MATERIAL
// =============================================================================

/// The ceiling material chosen for a part.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSelection {
    pub material_id: String,
    pub thickness_mm: f64,
    /// Entries excluded because their condition failed.
    pub warnings: Vec<Warning>,
}

/// Selects the ceiling material of `part`.
///
/// `bindings` must not contain `T`; it is bound per entry.
pub fn resolve_material(
    part: &PartTemplate,
    bindings: &Bindings,
    scopes: &ScopeSets,
) -> Result<MaterialSelection, RuleError> {
    let condition = match part.material_expression() {
        Some(expr) if !expr.is_empty() => Some(expr),
        _ => None,
    };
    if let Some(expr) = condition {
        // A condition that does not compile fails for every entry alike.
        scopes
            .compile(expr)
            .map_err(RuleError::MaterialExpression)?;
    }

    let mut warnings = Vec::new();
    let mut best: Option<(&str, f64)> = None;

    for entry in part.material_whitelist() {
        if let Some(expr) = condition {
            let entry_bindings = bindings.clone().with("t", entry.thickness_mm);
            match scopes.boolean(expr, &entry_bindings) {
                Ok(true) => {}
                Ok(false) => {
                    trace!(part = part.name(), material = %entry.material_id, "material condition false");
                    continue;
                }
                Err(error) => {
                    warn!(part = part.name(), material = %entry.material_id, %error, "material condition failed");
                    warnings.push(Warning::MaterialConditionFailed {
                        part: part.name().to_string(),
                        material_id: entry.material_id.clone(),
                        reason: error.to_string(),
                    });
                    continue;
                }
            }
        }

        // Strictly greater keeps the first declared entry on ties.
        if best.map_or(true, |(_, thickness)| entry.thickness_mm > thickness) {
            best = Some((&entry.material_id, entry.thickness_mm));
        }
    }

    match best {
        Some((material_id, thickness_mm)) => {
            debug!(part = part.name(), material = material_id, thickness_mm, "material selected");
            Ok(MaterialSelection {
                material_id: material_id.to_string(),
                thickness_mm,
                warnings,
            })
        }
        None => Err(RuleError::NoApplicableMaterial(part.name().to_string())),
    }
}

// =============================================================================
// HARDWARE
// =============================================================================

/// One hardware line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareRequirement {
    pub hardware_id: String,
    pub quantity: f64,
}

/// Outcome of evaluating a list of hardware rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareResolution {
    /// Lines of applicable rules, in rule order.
    pub lines: Vec<HardwareRequirement>,
    /// Applicable rules whose quantity could not be used.
    pub errors: Vec<RuleError>,
    /// Rules skipped because their condition failed.
    pub warnings: Vec<Warning>,
}

/// Evaluates hardware rules. `owner` names the part, `None` for product level.
pub fn resolve_hardware(
    rules: &[HardwareRule],
    bindings: &Bindings,
    scopes: &ScopeSets,
    owner: Option<&str>,
) -> HardwareResolution {
    let mut resolution = HardwareResolution::default();

    for rule in rules {
        if let Some(condition) = rule.condition.as_ref().filter(|c| !c.is_empty()) {
            match scopes.boolean(condition, bindings) {
                Ok(true) => {}
                Ok(false) => {
                    trace!(hardware = %rule.hardware_id, "hardware not applicable");
                    continue;
                }
                Err(error) => {
                    warn!(hardware = %rule.hardware_id, %error, "hardware condition failed");
                    resolution.warnings.push(Warning::HardwareConditionFailed {
                        part: owner.map(str::to_string),
                        hardware_id: rule.hardware_id.clone(),
                        reason: error.to_string(),
                    });
                    continue;
                }
            }
        }

        match scopes.number(&rule.quantity, bindings) {
            Ok(value) if value.is_finite() && value >= 0.0 => {
                resolution.lines.push(HardwareRequirement {
                    hardware_id: rule.hardware_id.clone(),
                    quantity: value,
                });
            }
            Ok(value) => {
                warn!(hardware = %rule.hardware_id, value, "invalid hardware quantity");
                resolution.errors.push(RuleError::InvalidQuantity {
                    hardware_id: rule.hardware_id.clone(),
                    value,
                });
            }
            Err(source) => {
                resolution.errors.push(quantity_failed(rule, source));
            }
        }
    }

    resolution
}

fn quantity_failed(rule: &HardwareRule, source: ExpressionError) -> RuleError {
    warn!(hardware = %rule.hardware_id, error = %source, "hardware quantity failed");
    RuleError::HardwareQuantityFailed {
        hardware_id: rule.hardware_id.clone(),
        source,
    }
}

/// Sums quantities per hardware id, keeping first-appearance order.
pub fn aggregate_hardware(
    lines: impl IntoIterator<Item = HardwareRequirement>,
) -> Vec<HardwareRequirement> {
    let mut totals: Vec<HardwareRequirement> = Vec::new();
    for line in lines {
        match totals.iter_mut().find(|t| t.hardware_id == line.hardware_id) {
            Some(total) => total.quantity += line.quantity,
            None => totals.push(line),
        }
    }
    totals
}

// =============================================================================
// EDGE BANDS
// =============================================================================

/// Chosen edge band per side, `None` where no band is applied.
pub type SelectedEdgebands = BTreeMap<EdgebandSide, Option<String>>;

/// Applied sides take their default, falling back to the first whitelist entry.
pub fn resolve_edgebands(rules: &EdgebandRules) -> SelectedEdgebands {
    EdgebandSide::ALL
        .into_iter()
        .map(|side| {
            let rule = rules.side(side);
            let choice = if rule.applied {
                rule.default
                    .clone()
                    .or_else(|| rule.whitelist.first().cloned())
            } else {
                None
            };
            (side, choice)
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
