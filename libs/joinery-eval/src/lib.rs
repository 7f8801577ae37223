//! # Joinery Eval
//!
//! Evaluates parsed joinery expressions against concrete bindings.
//!
//! ## Example
//!
//! ```rust
//! use joinery_eval::{evaluate_number, Bindings};
//! use joinery_expr::{parse, Scope};
//!
//! let ast = parse("round(2.346, 0.01)", Scope::Global).unwrap();
//! let value = evaluate_number(&ast, &Bindings::new()).unwrap();
//! assert!((value - 2.35).abs() < 1e-12);
//! ```

pub mod bindings;
pub mod error;
pub mod evaluator;
pub mod value;

pub use bindings::Bindings;
pub use error::EvalError;
pub use evaluator::{evaluate, evaluate_bool, evaluate_number};
pub use value::{Value, ValueType};
