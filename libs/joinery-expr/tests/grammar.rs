use joinery_expr::{parse, BinaryOp, Expr, Function, ParseErrorKind, Scope};

fn root(source: &str) -> Expr {
    parse(source, Scope::Global)
        .unwrap_or_else(|e| panic!("{source}: {e}"))
        .root
}

#[test]
fn comparison_binds_looser_than_arithmetic() {
    match root("product_height - 20 <= 900") {
        Expr::Binary { op, left, .. } => {
            assert_eq!(op, BinaryOp::LessEqual);
            assert!(matches!(*left, Expr::Binary { op: BinaryOp::Subtract, .. }));
        }
        other => panic!("expected comparison, got {other:?}"),
    }
}

#[test]
fn parenthesized_group_overrides_precedence() {
    match root("(product_length - 36) / 2") {
        Expr::Binary { op, left, .. } => {
            assert_eq!(op, BinaryOp::Divide);
            assert!(matches!(*left, Expr::Binary { op: BinaryOp::Subtract, .. }));
        }
        other => panic!("expected division, got {other:?}"),
    }
}

#[test]
fn nested_calls() {
    match root("round(max(product_width, 300) / 3, 0.5)") {
        Expr::Call { function, args, .. } => {
            assert_eq!(function, Function::Round);
            assert!(matches!(args[0], Expr::Binary { .. }));
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn identifiers_are_case_insensitive() {
    let a = parse("Product_Length + GAP", Scope::Global).unwrap();
    let b = parse("product_length + gap", Scope::Global).unwrap();
    assert_eq!(a.identifiers(), b.identifiers());
}

#[test]
fn identical_sources_parse_identically() {
    let source = "not (L > 600) and W < 400 or T == 18";
    assert_eq!(parse(source, Scope::Part), parse(source, Scope::Part));
}

#[test]
fn function_name_used_as_identifier_is_an_identifier() {
    // Without a following `(` a function name is a plain identifier.
    assert_eq!(
        parse("max + 1", Scope::Global).unwrap().identifiers(),
        vec!["max".to_string()]
    );
}

#[test]
fn error_offsets_are_character_offsets() {
    let err = parse("é + (1", Scope::Global).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnbalancedDelimiter);
    assert_eq!(err.offset, 4);

    let err = parse("1 + 2 +", Scope::Global).unwrap_err();
    assert_eq!(err.offset, 7);
}

#[test]
fn unknown_function_names_the_call() {
    let err = parse("floor(product_length)", Scope::Global).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::UnknownFunction {
            name: "floor".to_string()
        }
    );
    assert_eq!(err.offset, 0);
}

#[test]
fn deep_nesting_hits_hard_cap_without_overflowing() {
    let source = format!("{}1", "-".repeat(2_000));
    let err = parse(&source, Scope::Global).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { .. }));
}
