use joinery_expr::scope::{allowed_identifiers, ScopeSource};
use joinery_expr::{CompileError, EngineConfig, Expression, Scope, Violation};

struct Wardrobe;

impl ScopeSource for Wardrobe {
    fn parameter_abbreviations(&self) -> Vec<&str> {
        vec!["SH", "BT"]
    }

    fn part_names(&self) -> Vec<&str> {
        vec!["Side Panel", "Shelf"]
    }
}

#[test]
fn global_expression_with_allowed_names_is_valid() {
    let allowed = allowed_identifiers(Scope::Global, &Wardrobe);
    let expr = Expression::global("product_height - 2 * side_panel_thickness - SH");
    assert!(expr.validate(&allowed).is_ok());
    assert!(expr.compile(&allowed, &EngineConfig::default()).is_ok());
}

#[test]
fn part_expression_with_shorthand_is_valid() {
    let allowed = allowed_identifiers(Scope::Part, &Wardrobe);
    let expr = Expression::part("w - 2 * t + bt");
    assert!(expr.validate(&allowed).is_ok());
}

#[test]
fn shorthand_is_not_visible_globally() {
    let allowed = allowed_identifiers(Scope::Global, &Wardrobe);
    let violations = Expression::global("L / 2").validate(&allowed).unwrap_err();
    assert_eq!(
        violations,
        vec![Violation::UnknownIdentifiers(vec!["l".to_string()])]
    );
}

#[test]
fn offenders_are_deduplicated_and_normalized() {
    let allowed = allowed_identifiers(Scope::Part, &Wardrobe);
    let violations = Expression::part("Depth + DEPTH + depth + product_length + Depth")
        .validate(&allowed)
        .unwrap_err();
    assert_eq!(
        violations,
        vec![Violation::UnknownIdentifiers(vec![
            "depth".to_string(),
            "product_length".to_string()
        ])]
    );
}

#[test]
fn unbalanced_delimiters_are_counted() {
    let allowed = allowed_identifiers(Scope::Part, &Wardrobe);
    let violations = Expression::part("max(L, (W)").validate(&allowed).unwrap_err();
    assert_eq!(
        violations,
        vec![Violation::UnbalancedDelimiter { open: 2, close: 1 }]
    );
}

#[test]
fn compile_surfaces_lexical_violations_before_parse_errors() {
    let allowed = allowed_identifiers(Scope::Part, &Wardrobe);
    let err = Expression::part("L + + x")
        .compile(&allowed, &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(err, CompileError::Violations(_)));
}
