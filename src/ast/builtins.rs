//! Built-in predicates.
//!
//! The registry is a static table fixed at compile time. Each builtin carries
//! its unification-position metadata:
//!
//! - `target_pos`: positions where an unbound variable directly receives the
//!   opposing value.
//! - `rec_target_pos`: positions where variables embedded inside array/object
//!   structure unify recursively against the opposing value.
//!
//! Lookup is by exact operator name (`"="`, `">="`, ...). The alias
//! (`"eq"`, `"gte"`, ...) is for display only.
//!
//! # Example
//!
//! ```rust
//! use regula::ast::builtins;
//!
//! let gte = builtins::lookup(">=").unwrap();
//! assert_eq!(gte.printable_name(), "gte");
//! assert!(!gte.unifies(0));
//! assert!(builtins::EQUALITY.unifies(1));
//! ```

use serde::{Deserialize, Serialize};

/// Semantics attached to a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equality,
    GreaterThan,
    GreaterThanEq,
    LessThan,
    LessThanEq,
    NotEqual,
}

/// A built-in predicate definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub operator: Operator,
    pub num_args: usize,
    pub target_pos: &'static [usize],
    pub rec_target_pos: &'static [usize],
}

impl Builtin {
    /// Name used when printing, e.g. `gte(a, b)` rather than `>=(a, b)`.
    pub fn printable_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    /// True if the argument at `pos` unifies, recursively or not.
    pub fn unifies(&self, pos: usize) -> bool {
        self.target_pos.contains(&pos) || self.unifies_recursively(pos)
    }

    /// True if variables embedded in collections at `pos` unify.
    pub fn unifies_recursively(&self, pos: usize) -> bool {
        self.rec_target_pos.contains(&pos)
    }

    /// True if any argument position unifies.
    pub fn is_unifying(&self) -> bool {
        (0..self.num_args).any(|pos| self.unifies(pos))
    }
}

/// The `=` operator.
pub static EQUALITY: Builtin = Builtin {
    name: "=",
    alias: Some("eq"),
    operator: Operator::Equality,
    num_args: 2,
    target_pos: &[],
    rec_target_pos: &[0, 1],
};

/// The `>` comparison.
pub static GREATER_THAN: Builtin = Builtin {
    name: ">",
    alias: Some("gt"),
    operator: Operator::GreaterThan,
    num_args: 2,
    target_pos: &[],
    rec_target_pos: &[],
};

/// The `>=` comparison.
pub static GREATER_THAN_EQ: Builtin = Builtin {
    name: ">=",
    alias: Some("gte"),
    operator: Operator::GreaterThanEq,
    num_args: 2,
    target_pos: &[],
    rec_target_pos: &[],
};

/// The `<` comparison.
pub static LESS_THAN: Builtin = Builtin {
    name: "<",
    alias: Some("lt"),
    operator: Operator::LessThan,
    num_args: 2,
    target_pos: &[],
    rec_target_pos: &[],
};

/// The `<=` comparison.
pub static LESS_THAN_EQ: Builtin = Builtin {
    name: "<=",
    alias: Some("lte"),
    operator: Operator::LessThanEq,
    num_args: 2,
    target_pos: &[],
    rec_target_pos: &[],
};

/// The `!=` comparison.
pub static NOT_EQUAL: Builtin = Builtin {
    name: "!=",
    alias: Some("neq"),
    operator: Operator::NotEqual,
    num_args: 2,
    target_pos: &[],
    rec_target_pos: &[],
};

/// Every registered builtin. Add new builtins here.
pub static BUILTINS: [&Builtin; 6] = [
    &EQUALITY,
    &GREATER_THAN,
    &GREATER_THAN_EQ,
    &LESS_THAN,
    &LESS_THAN_EQ,
    &NOT_EQUAL,
];

/// Find a builtin by its exact operator name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().copied().find(|b| b.name == name)
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.printable_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_only() {
        assert_eq!(lookup("=").map(|b| b.operator), Some(Operator::Equality));
        assert_eq!(lookup("!=").map(|b| b.operator), Some(Operator::NotEqual));
        assert!(lookup("eq").is_none());
        assert!(lookup("~").is_none());
    }

    #[test]
    fn test_unification_positions() {
        assert!(EQUALITY.unifies(0));
        assert!(EQUALITY.unifies(1));
        assert!(EQUALITY.unifies_recursively(0));
        assert!(!EQUALITY.unifies(2));
        for b in &BUILTINS[1..] {
            assert!(!b.is_unifying(), "{} must not bind variables", b.name);
            assert_eq!(b.num_args, 2);
        }
    }

    #[test]
    fn test_printable_names() {
        let names: Vec<_> = BUILTINS.iter().map(|b| b.printable_name()).collect();
        assert_eq!(names, vec!["eq", "gt", "gte", "lt", "lte", "neq"]);
    }
}
