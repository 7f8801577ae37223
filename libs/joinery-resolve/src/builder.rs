//! # Definition Builders
//!
//! Builders are the only way to assemble a definition in code. `build()`
//! checks the invariants, so a [`ProductDefinition`] or [`PartTemplate`]
//! in hand is always valid and never changes afterwards.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::Expression;
//! use joinery_resolve::{
//!     DefinitionError, EdgebandRule, EdgebandSide, HardwareRule, PartTemplate, ProductDefinition,
//!     ShapeType,
//! };
//!
//! let door = PartTemplate::builder("Door")
//!     .shape(ShapeType::Radius)
//!     .length(Expression::global("product_height - 4"))
//!     .width(Expression::global("product_width / 2 - 3"))
//!     .quantity(Expression::global("2"))
//!     .param1(Expression::global("30"))
//!     .material("mdf-19", 19.0)
//!     .edgeband(EdgebandSide::Top, EdgebandRule::applied("abs-2mm"))
//!     .hardware(HardwareRule::new("hinge", Expression::global("2")))
//!     .build()
//!     .unwrap();
//!
//! let err = ProductDefinition::builder()
//!     .part(door.clone())
//!     .part(door)
//!     .build()
//!     .unwrap_err();
//! assert_eq!(err, DefinitionError::DuplicatePartName("door".into()));
//! ```

use crate::error::DefinitionError;
use crate::model::{
    EdgebandRule, EdgebandRules, EdgebandSide, Geometry, HardwareRule, MaterialEntry, Parameter,
    PartTemplate, ProductDefinition, ShapeType,
};
use joinery_expr::Expression;

// =============================================================================
// PART TEMPLATE BUILDER
// =============================================================================

/// Assembles a [`PartTemplate`].
#[derive(Debug, Clone)]
pub struct PartTemplateBuilder {
    name: String,
    shape_type: ShapeType,
    geometry: Geometry,
    material_whitelist: Vec<MaterialEntry>,
    material_expression: Option<Expression>,
    edgebands: EdgebandRules,
    hardware_rules: Vec<HardwareRule>,
}

impl PartTemplate {
    /// Start building a part called `name`.
    pub fn builder(name: impl Into<String>) -> PartTemplateBuilder {
        PartTemplateBuilder {
            name: name.into(),
            shape_type: ShapeType::default(),
            geometry: Geometry::default(),
            material_whitelist: Vec::new(),
            material_expression: None,
            edgebands: EdgebandRules::default(),
            hardware_rules: Vec::new(),
        }
    }
}

impl PartTemplateBuilder {
    pub fn shape(mut self, shape_type: ShapeType) -> Self {
        self.shape_type = shape_type;
        self
    }

    pub fn length(mut self, equation: Expression) -> Self {
        self.geometry.length = Some(equation);
        self
    }

    pub fn width(mut self, equation: Expression) -> Self {
        self.geometry.width = Some(equation);
        self
    }

    pub fn quantity(mut self, equation: Expression) -> Self {
        self.geometry.quantity = Some(equation);
        self
    }

    pub fn param1(mut self, equation: Expression) -> Self {
        self.geometry.param1 = Some(equation);
        self
    }

    pub fn param2(mut self, equation: Expression) -> Self {
        self.geometry.param2 = Some(equation);
        self
    }

    /// Append a whitelist entry. Declaration order breaks thickness ties.
    pub fn material(mut self, material_id: impl Into<String>, thickness_mm: f64) -> Self {
        self.material_whitelist
            .push(MaterialEntry::new(material_id, thickness_mm));
        self
    }

    /// Condition gating each whitelist entry, evaluated in PART scope with
    /// `T` bound to the entry's thickness.
    pub fn material_expression(mut self, condition: Expression) -> Self {
        self.material_expression = Some(Expression::part(condition.source()));
        self
    }

    pub fn edgeband(mut self, side: EdgebandSide, rule: EdgebandRule) -> Self {
        *self.edgebands.side_mut(side) = rule;
        self
    }

    pub fn hardware(mut self, rule: HardwareRule) -> Self {
        self.hardware_rules.push(rule);
        self
    }

    /// Validate and freeze the part.
    pub fn build(self) -> Result<PartTemplate, DefinitionError> {
        let part = PartTemplate {
            name: self.name.trim().to_string(),
            shape_type: self.shape_type,
            geometry: self.geometry,
            material_whitelist: self.material_whitelist,
            material_expression: self.material_expression,
            edgebands: self.edgebands,
            hardware_rules: self.hardware_rules,
        };
        part.check()?;
        Ok(part)
    }
}

// =============================================================================
// PRODUCT BUILDER
// =============================================================================

/// Assembles a [`ProductDefinition`].
#[derive(Debug, Clone, Default)]
pub struct ProductBuilder {
    parameters: Vec<Parameter>,
    part_templates: Vec<PartTemplate>,
    hardware_rules: Vec<HardwareRule>,
    validation_expression: Option<Expression>,
}

impl ProductDefinition {
    /// Start building a product.
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }
}

impl ProductBuilder {
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append a part. Parts resolve in the order they are added.
    pub fn part(mut self, part: PartTemplate) -> Self {
        self.part_templates.push(part);
        self
    }

    /// Product-level hardware, added once per product.
    pub fn hardware(mut self, rule: HardwareRule) -> Self {
        self.hardware_rules.push(rule);
        self
    }

    /// Gate that rejects the whole configuration when false.
    pub fn validation(mut self, expression: Expression) -> Self {
        self.validation_expression = Some(expression);
        self
    }

    /// Validate and freeze the product.
    pub fn build(self) -> Result<ProductDefinition, DefinitionError> {
        let product = ProductDefinition::new_unchecked(
            self.parameters,
            self.part_templates,
            self.hardware_rules,
            self.validation_expression,
        );
        product.check()?;
        Ok(product)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(name: &str) -> PartTemplate {
        PartTemplate::builder(name)
            .length(Expression::global("product_height"))
            .width(Expression::global("product_width"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_part_name_rules() {
        assert_eq!(
            PartTemplate::builder("  ").build().unwrap_err(),
            DefinitionError::EmptyPartName
        );
        assert_eq!(
            PartTemplate::builder("2nd shelf").build().unwrap_err(),
            DefinitionError::InvalidPartName("2nd shelf".into())
        );
        assert_eq!(PartTemplate::builder(" Back ").build().unwrap().name(), "Back");
    }

    #[test]
    fn test_part_name_shadowing_product_identifiers() {
        let product_part = PartTemplate::builder("Product")
            .length(Expression::global("100"))
            .width(Expression::global("50"))
            .build();
        assert_eq!(
            product_part.unwrap_err(),
            DefinitionError::ReservedPartName("Product".into())
        );

        // `{part}_length` must never replace the built-in `product_length`.
        let json = r#"{"partTemplates": [
            {"name": "product", "geometry": {"lengthEq": {"source": "100"}}},
            {"name": "Shelf", "geometry": {"lengthEq": {"source": "product_length / 2"}}}
        ]}"#;
        let err = serde_json::from_str::<ProductDefinition>(json).unwrap_err();
        assert!(err.to_string().contains("collides with a built-in identifier"));

        assert!(PartTemplate::builder("Production").build().is_ok());
    }

    #[test]
    fn test_material_expression_is_part_scoped() {
        let part = PartTemplate::builder("Shelf")
            .material("ply-18", 18.0)
            .material_expression(Expression::global("T <= 18"))
            .build()
            .unwrap();
        let condition = part.material_expression().unwrap();
        assert_eq!(condition.scope(), joinery_expr::Scope::Part);
        assert_eq!(condition.source(), "T <= 18");
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let err = ProductDefinition::builder()
            .part(panel("Side Panel"))
            .part(panel("side-panel"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicatePartName("side_panel".into()));
    }

    #[test]
    fn test_abbreviation_rules() {
        let build = |abbr: &str| {
            ProductDefinition::builder()
                .parameter(Parameter::new("p", abbr, 1.0))
                .part(panel("Shelf"))
                .build()
        };
        assert!(build("SH").is_ok());
        assert_eq!(build("L").unwrap_err(), DefinitionError::ReservedAbbreviation("L".into()));
        assert_eq!(
            build("shelf_width").unwrap_err(),
            DefinitionError::ReservedAbbreviation("shelf_width".into())
        );
        assert_eq!(
            build("1a").unwrap_err(),
            DefinitionError::InvalidAbbreviation("1a".into())
        );
    }

    #[test]
    fn test_non_finite_default_rejected() {
        let err = ProductDefinition::builder()
            .parameter(Parameter::new("gap", "GAP", f64::NAN))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::InvalidDefault("GAP".into()));
    }

    #[test]
    fn test_invalid_material_thickness() {
        let err = PartTemplate::builder("Top")
            .material("oak", 0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidMaterial { .. }));
    }
}
