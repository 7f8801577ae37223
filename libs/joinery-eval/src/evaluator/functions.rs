//! Built-in functions. Arity is guaranteed by the parser.

use crate::error::EvalError;
use config::constants::approx_equal;
use joinery_expr::Function;

/// Applies `function` to already-evaluated numeric arguments.
pub(super) fn call(function: Function, args: &[f64]) -> Result<f64, EvalError> {
    match (function, args) {
        (Function::Min, [a, b]) => Ok(a.min(*b)),
        (Function::Max, [a, b]) => Ok(a.max(*b)),
        (Function::Abs, [x]) => Ok(x.abs()),
        (Function::Round, [value, precision]) => round_to(*value, *precision),
        // A deserialized AST can carry any argument count.
        _ => Err(EvalError::WrongArity {
            function: function.name().to_string(),
            expected: function.arity(),
            found: args.len(),
        }),
    }
}

/// Rounds `value` to the nearest multiple of `|precision|`, half away from zero.
///
/// When `1 / precision` is a whole number (0.01, 0.5, 1) the value is scaled
/// up instead of divided, which keeps results like `round(2.346, 0.01)` exact.
fn round_to(value: f64, precision: f64) -> Result<f64, EvalError> {
    let step = precision.abs();
    if step == 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    let inverse = 1.0 / step;
    let whole = inverse.round();
    if whole >= 1.0 && approx_equal(inverse, whole) {
        Ok((value * whole).round() / whole)
    } else {
        Ok((value / step).round() * step)
    }
}
