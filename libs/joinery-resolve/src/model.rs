//! # Product Model
//!
//! Immutable value objects describing a parametric product. Definitions are
//! assembled with the builders in [`crate::builder`] or deserialized, and in
//! both cases pass [`ProductDefinition::check`] before they exist.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::Expression;
//! use joinery_resolve::{Parameter, PartTemplate, ProductDefinition};
//!
//! let shelf = PartTemplate::builder("Shelf")
//!     .length(Expression::global("product_length - 2 * SH"))
//!     .width(Expression::global("product_width"))
//!     .material("oak-18", 18.0)
//!     .build()
//!     .unwrap();
//!
//! let product = ProductDefinition::builder()
//!     .parameter(Parameter::new("Side thickness", "SH", 18.0))
//!     .part(shelf)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(product.part_templates().len(), 1);
//! ```

use crate::error::DefinitionError;
use joinery_expr::lexer::KEYWORDS;
use joinery_expr::scope::{
    is_identifier, normalize_identifier, normalize_part_name, part_identifiers, ScopeSource,
    LOCAL_SHORTHAND, PRODUCT_IDENTIFIERS,
};
use joinery_expr::{Expression, Function};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// =============================================================================
// PARAMETERS
// =============================================================================

/// A named numeric parameter of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    /// Identifier usable inside expressions, case-insensitive.
    pub abbreviation: String,
    pub default_value: f64,
    #[serde(default)]
    pub description: String,
}

impl Parameter {
    /// Parameter without a description.
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>, default_value: f64) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            default_value,
            description: String::new(),
        }
    }

    /// Attach a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// =============================================================================
// SHAPES & GEOMETRY
// =============================================================================

/// Outline of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    #[default]
    Rectangle,
    /// Rounded corner, `param1` is the radius.
    Radius,
    /// L-shaped cut-out, `param1`/`param2` are the cut-out sides.
    LShape,
    /// Angled cut, `param1`/`param2` are the cut legs.
    Angled,
}

impl ShapeType {
    /// Number of extra shape parameters the outline needs.
    pub fn extra_parameters(&self) -> usize {
        match self {
            ShapeType::Rectangle => 0,
            ShapeType::Radius => 1,
            ShapeType::LShape | ShapeType::Angled => 2,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Radius => "radius",
            ShapeType::LShape => "l_shape",
            ShapeType::Angled => "angled",
        })
    }
}

/// Geometry equations of a part.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    #[serde(rename = "lengthEq")]
    pub length: Option<Expression>,
    #[serde(rename = "widthEq")]
    pub width: Option<Expression>,
    /// Blank or missing means one piece.
    #[serde(rename = "qtyEq")]
    pub quantity: Option<Expression>,
    #[serde(rename = "param1Eq")]
    pub param1: Option<Expression>,
    #[serde(rename = "param2Eq")]
    pub param2: Option<Expression>,
}

// =============================================================================
// MATERIALS, EDGE BANDS, HARDWARE
// =============================================================================

/// A board material a part may be cut from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEntry {
    pub material_id: String,
    pub thickness_mm: f64,
}

impl MaterialEntry {
    /// Whitelist entry for `material_id` at `thickness_mm`.
    pub fn new(material_id: impl Into<String>, thickness_mm: f64) -> Self {
        Self {
            material_id: material_id.into(),
            thickness_mm,
        }
    }
}

/// Edge of a rectangular part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgebandSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl EdgebandSide {
    pub const ALL: [EdgebandSide; 4] = [
        EdgebandSide::Top,
        EdgebandSide::Right,
        EdgebandSide::Bottom,
        EdgebandSide::Left,
    ];
}

/// Edge band choice for one side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgebandRule {
    pub whitelist: Vec<String>,
    pub default: Option<String>,
    pub applied: bool,
}

impl EdgebandRule {
    /// Applied rule defaulting to `material_id`.
    pub fn applied(material_id: impl Into<String>) -> Self {
        let material_id = material_id.into();
        Self {
            whitelist: vec![material_id.clone()],
            default: Some(material_id),
            applied: true,
        }
    }
}

/// Edge band rules for all four sides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgebandRules {
    pub top: EdgebandRule,
    pub right: EdgebandRule,
    pub bottom: EdgebandRule,
    pub left: EdgebandRule,
}

impl EdgebandRules {
    /// Rule for one side.
    pub fn side(&self, side: EdgebandSide) -> &EdgebandRule {
        match side {
            EdgebandSide::Top => &self.top,
            EdgebandSide::Right => &self.right,
            EdgebandSide::Bottom => &self.bottom,
            EdgebandSide::Left => &self.left,
        }
    }

    pub fn side_mut(&mut self, side: EdgebandSide) -> &mut EdgebandRule {
        match side {
            EdgebandSide::Top => &mut self.top,
            EdgebandSide::Right => &mut self.right,
            EdgebandSide::Bottom => &mut self.bottom,
            EdgebandSide::Left => &mut self.left,
        }
    }
}

/// Conditional hardware requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareRule {
    pub hardware_id: String,
    #[serde(rename = "quantityEquation")]
    pub quantity: Expression,
    /// Rule applies only when this evaluates to true.
    #[serde(rename = "applicabilityCondition", default)]
    pub condition: Option<Expression>,
}

impl HardwareRule {
    /// Unconditional rule needing `quantity` of `hardware_id`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::Expression;
    /// use joinery_resolve::HardwareRule;
    ///
    /// let hinges = HardwareRule::new("hinge", Expression::global("round(product_height / 600, 1)"))
    ///     .when(Expression::global("product_height > 400"));
    /// assert!(hinges.condition.is_some());
    /// ```
    pub fn new(hardware_id: impl Into<String>, quantity: Expression) -> Self {
        Self {
            hardware_id: hardware_id.into(),
            quantity,
            condition: None,
        }
    }

    /// Restrict the rule to when `condition` holds.
    pub fn when(mut self, condition: Expression) -> Self {
        self.condition = Some(condition);
        self
    }
}

// =============================================================================
// PART TEMPLATE
// =============================================================================

/// One part of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartTemplate {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) shape_type: ShapeType,
    #[serde(default)]
    pub(crate) geometry: Geometry,
    #[serde(default)]
    pub(crate) material_whitelist: Vec<MaterialEntry>,
    /// Condition gating each whitelist entry with `T` bound. Always PART
    /// scope, whatever scope the source declares.
    #[serde(default, deserialize_with = "part_scoped")]
    pub(crate) material_expression: Option<Expression>,
    #[serde(default, rename = "edgebandRules")]
    pub(crate) edgebands: EdgebandRules,
    #[serde(default)]
    pub(crate) hardware_rules: Vec<HardwareRule>,
}

impl PartTemplate {
    /// Name as declared, trimmed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name as used in `{part}_length`, `{part}_width`, `{part}_thickness`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_resolve::PartTemplate;
    ///
    /// let part = PartTemplate::builder("Side-Panel 2").build().unwrap();
    /// assert_eq!(part.normalized_name(), "side_panel_2");
    /// ```
    pub fn normalized_name(&self) -> String {
        normalize_part_name(&self.name)
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Length, width, quantity and shape parameter equations.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Candidate materials in declaration order.
    pub fn material_whitelist(&self) -> &[MaterialEntry] {
        &self.material_whitelist
    }

    /// PART-scope condition gating each whitelist entry.
    pub fn material_expression(&self) -> Option<&Expression> {
        self.material_expression.as_ref()
    }

    pub fn edgebands(&self) -> &EdgebandRules {
        &self.edgebands
    }

    /// Hardware needed per piece of this part.
    pub fn hardware_rules(&self) -> &[HardwareRule] {
        &self.hardware_rules
    }

    /// Invariants that hold for a part on its own.
    pub(crate) fn check(&self) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptyPartName);
        }
        if !is_identifier(&self.normalized_name()) {
            return Err(DefinitionError::InvalidPartName(self.name.clone()));
        }
        if part_identifiers(&self.name).iter().any(|id| is_reserved(id)) {
            return Err(DefinitionError::ReservedPartName(self.name.clone()));
        }
        for entry in &self.material_whitelist {
            let thickness_ok = entry.thickness_mm.is_finite() && entry.thickness_mm > 0.0;
            if entry.material_id.trim().is_empty() || !thickness_ok {
                return Err(DefinitionError::InvalidMaterial {
                    part: self.name.clone(),
                    material_id: entry.material_id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// `T` only exists in PART scope, so the material condition is read as such.
fn part_scoped<'de, D>(deserializer: D) -> Result<Option<Expression>, D::Error>
where
    D: Deserializer<'de>,
{
    let condition = Option::<Expression>::deserialize(deserializer)?;
    Ok(condition.map(|c| Expression::part(c.source())))
}

// =============================================================================
// PRODUCT DEFINITION
// =============================================================================

/// A complete parametric product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProductRepr")]
pub struct ProductDefinition {
    parameters: Vec<Parameter>,
    part_templates: Vec<PartTemplate>,
    hardware_rules: Vec<HardwareRule>,
    validation_expression: Option<Expression>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRepr {
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    part_templates: Vec<PartTemplate>,
    #[serde(default)]
    hardware_rules: Vec<HardwareRule>,
    #[serde(default)]
    validation_expression: Option<Expression>,
}

impl TryFrom<ProductRepr> for ProductDefinition {
    type Error = DefinitionError;

    fn try_from(repr: ProductRepr) -> Result<Self, Self::Error> {
        let product = ProductDefinition::new_unchecked(
            repr.parameters,
            repr.part_templates,
            repr.hardware_rules,
            repr.validation_expression,
        );
        product.check()?;
        Ok(product)
    }
}

impl ProductDefinition {
    pub(crate) fn new_unchecked(
        parameters: Vec<Parameter>,
        part_templates: Vec<PartTemplate>,
        hardware_rules: Vec<HardwareRule>,
        validation_expression: Option<Expression>,
    ) -> Self {
        Self {
            parameters,
            part_templates,
            hardware_rules,
            validation_expression,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parts in resolution order.
    pub fn part_templates(&self) -> &[PartTemplate] {
        &self.part_templates
    }

    /// Product-level hardware rules.
    pub fn hardware_rules(&self) -> &[HardwareRule] {
        &self.hardware_rules
    }

    /// GLOBAL-scope gate evaluated after every part has resolved.
    pub fn validation_expression(&self) -> Option<&Expression> {
        self.validation_expression.as_ref()
    }

    /// Parameter defaults keyed by lower-cased abbreviation.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_resolve::{Parameter, ProductDefinition};
    ///
    /// let product = ProductDefinition::builder()
    ///     .parameter(Parameter::new("Shelf gap", "GAP", 2.0))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(product.default_parameter_values()["gap"], 2.0);
    /// ```
    pub fn default_parameter_values(&self) -> BTreeMap<String, f64> {
        self.parameters
            .iter()
            .map(|p| (normalize_identifier(&p.abbreviation), p.default_value))
            .collect()
    }

    /// Verifies every definition invariant.
    ///
    /// - part names are non-empty, unique after normalization and normalize
    ///   to identifiers
    /// - no `{part}_length`, `{part}_width` or `{part}_thickness` shadows a
    ///   built-in identifier, keyword or function
    /// - abbreviations are identifiers, unique case-insensitively, and do not
    ///   shadow keywords, functions, built-in or part identifiers
    /// - parameter defaults are finite
    pub fn check(&self) -> Result<(), DefinitionError> {
        let mut part_names = HashSet::new();
        let mut synthetic = HashSet::new();
        for part in &self.part_templates {
            part.check()?;
            let normalized = part.normalized_name();
            if !part_names.insert(normalized.clone()) {
                return Err(DefinitionError::DuplicatePartName(normalized));
            }
            synthetic.extend(part_identifiers(&part.name));
        }

        let mut abbreviations = HashSet::new();
        for parameter in &self.parameters {
            let abbreviation = parameter.abbreviation.trim();
            if !is_identifier(abbreviation) {
                return Err(DefinitionError::InvalidAbbreviation(
                    parameter.abbreviation.clone(),
                ));
            }
            let normalized = normalize_identifier(abbreviation);
            if is_reserved(&normalized) || synthetic.contains(&normalized) {
                return Err(DefinitionError::ReservedAbbreviation(
                    parameter.abbreviation.clone(),
                ));
            }
            if !abbreviations.insert(normalized) {
                return Err(DefinitionError::DuplicateAbbreviation(
                    parameter.abbreviation.clone(),
                ));
            }
            if !parameter.default_value.is_finite() {
                return Err(DefinitionError::InvalidDefault(
                    parameter.abbreviation.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Names no parameter may take.
fn is_reserved(name: &str) -> bool {
    KEYWORDS.contains(&name)
        || Function::from_name(name).is_some()
        || PRODUCT_IDENTIFIERS.contains(&name)
        || LOCAL_SHORTHAND.contains(&name)
}

impl ScopeSource for ProductDefinition {
    fn parameter_abbreviations(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.abbreviation.as_str()).collect()
    }

    fn part_names(&self) -> Vec<&str> {
        self.part_templates.iter().map(|p| p.name.as_str()).collect()
    }
}

// =============================================================================
// INPUTS
// =============================================================================

/// Concrete product dimensions for one run, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDims {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

fn default_quantity() -> f64 {
    config::constants::DEFAULT_PRODUCT_QUANTITY
}

impl ProductDims {
    /// Dimensions with a quantity of one.
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
            quantity: default_quantity(),
        }
    }

    /// Same dimensions, ordered `quantity` times.
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Everything a resolution run needs besides the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveInputs {
    pub product_dims: ProductDims,
    /// Values replacing parameter defaults, keyed by abbreviation.
    #[serde(default)]
    pub parameter_overrides: BTreeMap<String, f64>,
}

impl ResolveInputs {
    /// Inputs using every parameter default.
    pub fn new(product_dims: ProductDims) -> Self {
        Self {
            product_dims,
            parameter_overrides: BTreeMap::new(),
        }
    }

    /// Override one parameter.
    pub fn with_override(mut self, abbreviation: impl Into<String>, value: f64) -> Self {
        self.parameter_overrides.insert(abbreviation.into(), value);
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
