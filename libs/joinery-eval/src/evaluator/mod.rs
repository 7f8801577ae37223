//! Evaluator entry points.
//!
//! Evaluation is pure: the same AST and bindings always produce the same
//! result. Nothing is coerced between numbers and booleans.

mod functions;

use crate::bindings::Bindings;
use crate::error::EvalError;
use crate::value::{Value, ValueType};
use config::constants::{approx_equal, STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};
use joinery_expr::{Ast, BinaryOp, Expr, UnaryOp};
use stacker::maybe_grow;

/// Evaluates a parsed expression against `bindings`.
///
/// # Examples
/// ```
/// use joinery_eval::{evaluate, Bindings, Value};
/// use joinery_expr::{parse, Scope};
///
/// let ast = parse("min(L, 600) - 2 * T", Scope::Part).unwrap();
/// let bindings = Bindings::new().with("L", 720.0).with("T", 18.0);
/// assert_eq!(evaluate(&ast, &bindings).unwrap(), Value::Number(564.0));
/// ```
pub fn evaluate(ast: &Ast, bindings: &Bindings) -> Result<Value, EvalError> {
    eval_expr(&ast.root, bindings)
}

/// Evaluates an expression that must produce a number.
pub fn evaluate_number(ast: &Ast, bindings: &Bindings) -> Result<f64, EvalError> {
    expect_number(evaluate(ast, bindings)?)
}

/// Evaluates an expression that must produce a boolean.
pub fn evaluate_bool(ast: &Ast, bindings: &Bindings) -> Result<bool, EvalError> {
    expect_bool(evaluate(ast, bindings)?)
}

fn eval_expr(expr: &Expr, bindings: &Bindings) -> Result<Value, EvalError> {
    match expr {
        Expr::Number { value, .. } => Ok(Value::Number(*value)),
        Expr::Boolean { value, .. } => Ok(Value::Boolean(*value)),
        Expr::Identifier { name, .. } => bindings
            .get(name)
            .ok_or_else(|| EvalError::UnboundIdentifier { name: name.clone() }),
        Expr::Unary { op, operand, .. } => maybe_grow(
            STACKER_RED_ZONE_BYTES,
            STACKER_STACK_SIZE_BYTES,
            || eval_unary(*op, operand, bindings),
        ),
        Expr::Binary {
            op, left, right, ..
        } => maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
            eval_binary(*op, left, right, bindings)
        }),
        Expr::Call { function, args, .. } => {
            maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
                let values = args
                    .iter()
                    .map(|arg| eval_expr(arg, bindings).and_then(expect_number))
                    .collect::<Result<Vec<f64>, EvalError>>()?;
                functions::call(*function, &values).map(Value::Number)
            })
        }
    }
}

fn eval_unary(op: UnaryOp, operand: &Expr, bindings: &Bindings) -> Result<Value, EvalError> {
    let value = eval_expr(operand, bindings)?;
    match op {
        UnaryOp::Negate => Ok(Value::Number(-expect_number(value)?)),
        UnaryOp::Not => Ok(Value::Boolean(!expect_bool(value)?)),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    bindings: &Bindings,
) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => eval_logical(false, left, right, bindings),
        BinaryOp::Or => eval_logical(true, left, right, bindings),
        _ => {
            let l = expect_number(eval_expr(left, bindings)?)?;
            let r = expect_number(eval_expr(right, bindings)?)?;
            apply_numeric(op, l, r)
        }
    }
}

/// `and` / `or`: a left operand equal to `decisive` settles the result.
fn eval_logical(
    decisive: bool,
    left: &Expr,
    right: &Expr,
    bindings: &Bindings,
) -> Result<Value, EvalError> {
    if expect_bool(eval_expr(left, bindings)?)? == decisive {
        return Ok(Value::Boolean(decisive));
    }
    Ok(Value::Boolean(expect_bool(eval_expr(right, bindings)?)?))
}

fn apply_numeric(op: BinaryOp, l: f64, r: f64) -> Result<Value, EvalError> {
    let value = match op {
        BinaryOp::Add => Value::Number(l + r),
        BinaryOp::Subtract => Value::Number(l - r),
        BinaryOp::Multiply => Value::Number(l * r),
        BinaryOp::Divide => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Value::Number(l / r)
        }
        BinaryOp::Equal => Value::Boolean(approx_equal(l, r)),
        BinaryOp::NotEqual => Value::Boolean(!approx_equal(l, r)),
        BinaryOp::Less => Value::Boolean(l < r),
        BinaryOp::Greater => Value::Boolean(l > r),
        BinaryOp::LessEqual => Value::Boolean(l <= r),
        BinaryOp::GreaterEqual => Value::Boolean(l >= r),
        BinaryOp::And | BinaryOp::Or => {
            return Err(EvalError::TypeMismatch {
                expected: ValueType::Boolean,
                actual: ValueType::Number,
            })
        }
    };
    Ok(value)
}

fn expect_number(value: Value) -> Result<f64, EvalError> {
    value.as_f64().ok_or(EvalError::TypeMismatch {
        expected: ValueType::Number,
        actual: value.value_type(),
    })
}

fn expect_bool(value: Value) -> Result<bool, EvalError> {
    value.as_bool().ok_or(EvalError::TypeMismatch {
        expected: ValueType::Boolean,
        actual: value.value_type(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use joinery_expr::{parse, Scope};

    fn eval(source: &str, bindings: &Bindings) -> Result<Value, EvalError> {
        let ast = parse(source, Scope::Global).unwrap();
        evaluate(&ast, bindings)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3", &Bindings::new()), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3", &Bindings::new()), Ok(Value::Number(9.0)));
        assert_eq!(eval("10 - 4 - 3", &Bindings::new()), Ok(Value::Number(3.0)));
        assert_eq!(eval("-2 * -3", &Bindings::new()), Ok(Value::Number(6.0)));
    }

    #[test]
    fn test_division_by_zero() {
        let bindings = Bindings::new().with("gap", 0.0);
        assert_eq!(eval("10 / gap", &bindings), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_equality_uses_tolerance() {
        assert_eq!(eval("0.1 + 0.2 == 0.3", &Bindings::new()), Ok(Value::Boolean(true)));
        assert_eq!(eval("0.1 + 0.2 != 0.3", &Bindings::new()), Ok(Value::Boolean(false)));
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(
            eval("true + 1", &Bindings::new()),
            Err(EvalError::TypeMismatch {
                expected: ValueType::Number,
                actual: ValueType::Boolean
            })
        );
        assert_eq!(
            eval("not 1", &Bindings::new()),
            Err(EvalError::TypeMismatch {
                expected: ValueType::Boolean,
                actual: ValueType::Number
            })
        );
        assert!(eval("true == true", &Bindings::new()).is_err());
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        // `missing` is unbound; it must never be looked up.
        assert_eq!(
            eval("false and missing > 1", &Bindings::new()),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            eval("true or 1 / 0 > 1", &Bindings::new()),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_unbound_identifier() {
        assert_eq!(
            eval("product_length / 2", &Bindings::new()),
            Err(EvalError::UnboundIdentifier {
                name: "product_length".into()
            })
        );
    }

    #[test]
    fn test_typed_helpers() {
        let ast = parse("1 < 2", Scope::Global).unwrap();
        assert_eq!(evaluate_bool(&ast, &Bindings::new()), Ok(true));
        assert!(matches!(
            evaluate_number(&ast, &Bindings::new()),
            Err(EvalError::TypeMismatch { .. })
        ));
    }
}
