//! # Scope Resolution
//!
//! Computes the identifiers an expression may reference in a given scope.
//!
//! - `GLOBAL`: product dimensions, parameter abbreviations and the synthetic
//!   `{part}_length`, `{part}_width`, `{part}_thickness` of every part.
//! - `PART`: the local shorthand `L, W, T, H, D` plus parameter abbreviations.
//!
//! All names are compared lower-cased.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::scope::{allowed_identifiers, Scope, ScopeSource};
//!
//! struct Shelf;
//!
//! impl ScopeSource for Shelf {
//!     fn parameter_abbreviations(&self) -> Vec<&str> {
//!         vec!["GAP"]
//!     }
//!     fn part_names(&self) -> Vec<&str> {
//!         vec!["Side Panel"]
//!     }
//! }
//!
//! let global = allowed_identifiers(Scope::Global, &Shelf);
//! assert!(global.contains("side_panel_length"));
//! assert!(global.contains("gap"));
//!
//! let part = allowed_identifiers(Scope::Part, &Shelf);
//! assert!(part.contains("t"));
//! assert!(!part.contains("product_length"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// SCOPE
// =============================================================================

/// Identifier-visibility context of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    /// Product-level: dimensions, parameters and resolved parts.
    #[default]
    Global,
    /// Local to one part template.
    Part,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("GLOBAL"),
            Scope::Part => f.write_str("PART"),
        }
    }
}

/// Lower-cased identifiers allowed in a scope.
pub type IdentifierSet = BTreeSet<String>;

/// Product-level identifiers visible at GLOBAL scope.
pub const PRODUCT_IDENTIFIERS: [&str; 4] =
    ["product_length", "product_width", "product_height", "quantity"];

/// Local shorthand visible at PART scope.
pub const LOCAL_SHORTHAND: [&str; 5] = ["l", "w", "t", "h", "d"];

/// Suffixes of the synthetic identifiers registered for every part.
pub const PART_SUFFIXES: [&str; 3] = ["length", "width", "thickness"];

// =============================================================================
// SCOPE SOURCE
// =============================================================================

/// Anything that declares parameters and parts.
pub trait ScopeSource {
    /// Declared parameter abbreviations, as written.
    fn parameter_abbreviations(&self) -> Vec<&str>;

    /// Declared part names, as written.
    fn part_names(&self) -> Vec<&str>;
}

/// Computes the identifiers referenceable in `scope`.
pub fn allowed_identifiers(scope: Scope, source: &impl ScopeSource) -> IdentifierSet {
    let mut allowed: IdentifierSet = source
        .parameter_abbreviations()
        .into_iter()
        .map(normalize_identifier)
        .collect();

    match scope {
        Scope::Global => {
            allowed.extend(PRODUCT_IDENTIFIERS.iter().map(|s| s.to_string()));
            for name in source.part_names() {
                allowed.extend(part_identifiers(name));
            }
        }
        Scope::Part => {
            allowed.extend(LOCAL_SHORTHAND.iter().map(|s| s.to_string()));
        }
    }

    allowed
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Canonical form of an identifier: lower-case.
pub fn normalize_identifier(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Canonical form of a part name used in synthetic identifiers.
///
/// Lower-cases the name and replaces every character outside
/// `[a-z0-9_]` with `_`.
///
/// ```rust
/// use joinery_expr::scope::normalize_part_name;
///
/// assert_eq!(normalize_part_name("Side Panel"), "side_panel");
/// assert_eq!(normalize_part_name(" Top-Shelf "), "top_shelf");
/// ```
pub fn normalize_part_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The three synthetic identifiers of a part.
pub fn part_identifiers(name: &str) -> [String; 3] {
    let base = normalize_part_name(name);
    PART_SUFFIXES.map(|suffix| format!("{base}_{suffix}"))
}

/// True when `name` matches `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// TESTS
// =============================================================================
