//! Variable bindings for one search branch.

use crate::ast::{Term, Value, Var};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from variable to value.
///
/// A `Bindings` is never mutated once handed to a search branch; extending it
/// produces a new set. Variables iterate in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    vars: BTreeMap<Var, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &Var) -> Option<&Value> {
        self.vars.get(var)
    }

    pub fn is_bound(&self, var: &Var) -> bool {
        self.vars.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, &Value)> {
        self.vars.iter()
    }

    /// Extend with `var = value`.
    ///
    /// Returns `None` when `var` is already bound to a different value.
    pub fn bind(&self, var: &Var, value: Value) -> Option<Bindings> {
        match self.vars.get(var) {
            Some(existing) if *existing == value => Some(self.clone()),
            Some(_) => None,
            None => {
                let mut next = self.clone();
                next.vars.insert(var.clone(), value);
                Some(next)
            }
        }
    }

    /// Value of a term under these bindings.
    ///
    /// Returns `None` if the term contains an unbound variable, a reference,
    /// or an object key that is not a string or appears twice.
    pub fn ground(&self, term: &Term) -> Option<Value> {
        match term {
            Term::Literal(v) => Some(v.clone()),
            Term::Var(v) => self.vars.get(v).cloned(),
            Term::Ref(_) => None,
            Term::Array(items) => items
                .iter()
                .map(|t| self.ground(t))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Term::Object(pairs) => {
                let mut obj = BTreeMap::new();
                for (k, v) in pairs {
                    match self.ground(k)? {
                        Value::String(key) => {
                            if obj.insert(key, self.ground(v)?).is_some() {
                                return None;
                            }
                        }
                        _ => return None,
                    }
                }
                Some(Value::Object(obj))
            }
        }
    }

    /// JSON object with one entry per bound variable
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.vars
                .iter()
                .map(|(k, v)| (k.name().to_string(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}
