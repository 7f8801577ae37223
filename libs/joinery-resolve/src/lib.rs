//! # Joinery Resolve
//!
//! Parametric product definitions and the pipeline that resolves them into
//! a bill of parts.
//!
//! ## Architecture
//!
//! ```text
//! ProductDefinition + ResolveInputs
//!     → EvaluationContext (dims, parameters, resolved parts)
//!     → per part: material → geometry → hardware → edge bands
//!     → validation expression
//!     → ResolvedBom
//! ```
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::Expression;
//! use joinery_resolve::{resolve, PartTemplate, ProductDefinition, ProductDims, ResolveInputs};
//!
//! let shelf = PartTemplate::builder("Shelf")
//!     .length(Expression::global("product_length / 2"))
//!     .width(Expression::global("product_width"))
//!     .build()
//!     .unwrap();
//! let product = ProductDefinition::builder().part(shelf).build().unwrap();
//!
//! let inputs = ResolveInputs::new(ProductDims::new(1000.0, 600.0, 800.0));
//! let bom = resolve(&product, &inputs).unwrap();
//! assert_eq!(bom.resolved_parts().next().unwrap().length, 500.0);
//! ```

pub mod api;
pub mod builder;
pub mod context;
pub mod error;
pub mod lint;
pub mod model;
pub mod pipeline;
pub mod rules;

// Re-export public API
pub use builder::{PartTemplateBuilder, ProductBuilder};
pub use context::{EvaluationContext, PartBinding, ScopeSets};
pub use error::{
    DefinitionError, ExpressionError, PartError, PipelineError, RuleError, Warning,
};
pub use lint::{lint_product, DefinitionIssue, LintProblem};
pub use model::{
    EdgebandRule, EdgebandRules, EdgebandSide, Geometry, HardwareRule, MaterialEntry, Parameter,
    PartTemplate, ProductDefinition, ProductDims, ResolveInputs, ShapeType,
};
pub use pipeline::{resolve, PartOutcome, ResolvedBom, ResolvedPart, Resolver};
pub use rules::{
    resolve_edgebands, resolve_hardware, resolve_material, HardwareRequirement,
    HardwareResolution, MaterialSelection, SelectedEdgebands,
};
