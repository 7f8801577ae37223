//! # Identifier Bindings
//!
//! Case-insensitive map from identifier to [`Value`] for one evaluation.
//!
//! ## Example
//!
//! ```rust
//! use joinery_eval::{Bindings, Value};
//!
//! let mut bindings = Bindings::new();
//! bindings.define("Product_Length", 1000.0);
//! assert_eq!(bindings.get("PRODUCT_LENGTH"), Some(Value::Number(1000.0)));
//! ```

use crate::value::Value;
use joinery_expr::scope::normalize_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier bindings, keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier value.
    pub fn define(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(normalize_identifier(name), value.into());
    }

    /// Builder form of [`Bindings::define`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.define(name, value);
        self
    }

    /// Remove a binding.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(&normalize_identifier(name))
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(&normalize_identifier(name)).copied()
    }

    /// Check whether a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&normalize_identifier(name))
    }

    /// Number of bound identifiers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: AsRef<str>, V: Into<Value>> FromIterator<(S, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        bindings.extend(iter);
        bindings
    }
}

impl<S: AsRef<str>, V: Into<Value>> Extend<(S, V)> for Bindings {
    fn extend<I: IntoIterator<Item = (S, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.define(name.as_ref(), value);
        }
    }
}
