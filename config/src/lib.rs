//! # Config Crate
//!
//! Centralized configuration for the joinery configuration engine.
//! Every limit, tolerance and sample value used by the expression parser,
//! the evaluator and the resolution pipeline is defined here so the crates
//! never scatter literals of their own.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{approx_equal, EngineConfig, MAX_AST_DEPTH};
//!
//! // Floating-point comparisons share one tolerance
//! assert!(approx_equal(0.1 + 0.2, 0.3));
//!
//! // Per-call limits never exceed the hard caps
//! let cfg = EngineConfig::default();
//! assert!(cfg.max_ast_depth <= MAX_AST_DEPTH);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Pure**: No I/O, no environment lookups
//! - **Bounded**: Hard caps protect the engine from pathological input

pub mod constants;
