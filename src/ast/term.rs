//! Query-language terms, expressions, bodies and rules.
//!
//! These structures are produced by the (external) compiler and are read-only
//! for the evaluator. A reference such as `data.a[i].b` is a [`Ref`] with base
//! `data` and segments `["a", i, "b"]`, where `i` is a variable.
//!
//! Terms have a serde form so compiled bodies can cross process boundaries as
//! JSON:
//!
//! ```json
//! {"type": "ref", "value": {"base": "data", "segments": [
//!     {"type": "literal", "value": "a"},
//!     {"type": "var", "value": "i"}
//! ]}}
//! ```
//!
//! # Example
//!
//! ```rust
//! use regula::ast::{Expr, Term};
//!
//! // data.a[i] = x
//! let expr = Expr::eq(
//!     Term::data_ref(vec![Term::lit("a"), Term::var("i")]),
//!     Term::var("x"),
//! );
//! assert_eq!(expr.to_string(), "eq(data.a[i], x)");
//! ```

use super::builtins;
use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the variable that addresses the root of the document store.
pub const DATA_ROOT: &str = "data";

/// A query variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Var(pub String);

impl Var {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Var(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// True for the store root variable `data`
    pub fn is_data(&self) -> bool {
        self.0 == DATA_ROOT
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Var::new(name)
    }
}

/// A reference into a document: a base variable followed by segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    pub base: Var,
    pub segments: Vec<Term>,
}

impl Ref {
    pub fn new(base: Var, segments: Vec<Term>) -> Self {
        Self { base, segments }
    }
}

/// A node of the query-language expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    Literal(Value),
    Var(Var),
    Ref(Ref),
    Array(Vec<Term>),
    Object(Vec<(Term, Term)>),
}

impl Term {
    /// Create a literal term
    pub fn lit<V: Into<Value>>(value: V) -> Self {
        Term::Literal(value.into())
    }

    /// Create a variable term
    pub fn var<S: Into<String>>(name: S) -> Self {
        Term::Var(Var::new(name))
    }

    /// Create a reference rooted at `data`
    pub fn data_ref(segments: Vec<Term>) -> Self {
        Term::Ref(Ref::new(Var::new(DATA_ROOT), segments))
    }

    /// Create a reference rooted at an arbitrary variable
    pub fn reference<S: Into<String>>(base: S, segments: Vec<Term>) -> Self {
        Term::Ref(Ref::new(Var::new(base), segments))
    }

    /// Create an array term
    pub fn array(items: Vec<Term>) -> Self {
        Term::Array(items)
    }

    /// Create an object term
    pub fn object(pairs: Vec<(Term, Term)>) -> Self {
        Term::Object(pairs)
    }

    /// True when the term contains no variables and no references.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Literal(_) => true,
            Term::Var(_) | Term::Ref(_) => false,
            Term::Array(items) => items.iter().all(Term::is_ground),
            Term::Object(pairs) => pairs.iter().all(|(k, v)| k.is_ground() && v.is_ground()),
        }
    }

    /// Convert a ground term into a value.
    ///
    /// Returns `None` for terms holding variables or references, and for
    /// object terms whose keys are not strings or repeat.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Term::Literal(v) => Some(v.clone()),
            Term::Var(_) | Term::Ref(_) => None,
            Term::Array(items) => items
                .iter()
                .map(Term::to_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Term::Object(pairs) => {
                let mut obj = BTreeMap::new();
                for (k, v) in pairs {
                    let key = match k.to_value()? {
                        Value::String(s) => s,
                        _ => return None,
                    };
                    if obj.insert(key, v.to_value()?).is_some() {
                        return None;
                    }
                }
                Some(Value::Object(obj))
            }
        }
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Literal(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(v) => write!(f, "{}", v),
            Term::Var(v) => write!(f, "{}", v),
            Term::Ref(r) => {
                write!(f, "{}", r.base)?;
                for seg in &r.segments {
                    match seg {
                        Term::Literal(Value::String(s)) if is_identifier(s) => write!(f, ".{}", s)?,
                        other => write!(f, "[{}]", other)?,
                    }
                }
                Ok(())
            }
            Term::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Term::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Segments that can be printed with dot notation.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single expression: a builtin operator applied to arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub operator: Var,
    pub args: Vec<Term>,
}

impl Expr {
    pub fn new<S: Into<String>>(operator: S, args: Vec<Term>) -> Self {
        Self {
            operator: Var::new(operator),
            args,
        }
    }

    /// `a = b`
    pub fn eq(a: Term, b: Term) -> Self {
        Self::new(builtins::EQUALITY.name, vec![a, b])
    }

    /// `a != b`
    pub fn neq(a: Term, b: Term) -> Self {
        Self::new(builtins::NOT_EQUAL.name, vec![a, b])
    }

    /// `a > b`
    pub fn gt(a: Term, b: Term) -> Self {
        Self::new(builtins::GREATER_THAN.name, vec![a, b])
    }

    /// `a >= b`
    pub fn gte(a: Term, b: Term) -> Self {
        Self::new(builtins::GREATER_THAN_EQ.name, vec![a, b])
    }

    /// `a < b`
    pub fn lt(a: Term, b: Term) -> Self {
        Self::new(builtins::LESS_THAN.name, vec![a, b])
    }

    /// `a <= b`
    pub fn lte(a: Term, b: Term) -> Self {
        Self::new(builtins::LESS_THAN_EQ.name, vec![a, b])
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match builtins::lookup(self.operator.name()) {
            Some(b) => b.printable_name(),
            None => self.operator.name(),
        };
        write!(f, "{}(", name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// An ordered conjunction of expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body(pub Vec<Expr>);

impl Body {
    pub fn new(exprs: Vec<Expr>) -> Self {
        Body(exprs)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Expr> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.0.iter()
    }
}

impl From<Vec<Expr>> for Body {
    fn from(exprs: Vec<Expr>) -> Self {
        Body(exprs)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", expr)?;
        }
        Ok(())
    }
}

/// Rule head: `p[key]` for partial sets, `p = value` for complete documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleHead {
    pub name: Var,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Term>,
}

/// A compiled rule: `head :- body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub head: RuleHead,
    pub body: Body,
}

impl Rule {
    /// `name[key] :- body`
    pub fn partial_set<S: Into<String>>(name: S, key: Term, body: Body) -> Self {
        Self {
            head: RuleHead {
                name: Var::new(name),
                key: Some(key),
                value: None,
            },
            body,
        }
    }

    /// `name = value :- body`
    pub fn complete<S: Into<String>>(name: S, value: Term, body: Body) -> Self {
        Self {
            head: RuleHead {
                name: Var::new(name),
                key: None,
                value: Some(value),
            },
            body,
        }
    }

    pub fn name(&self) -> &str {
        self.head.name.name()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head.name)?;
        if let Some(key) = &self.head.key {
            write!(f, "[{}]", key)?;
        }
        if let Some(value) = &self.head.value {
            write!(f, " = {}", value)?;
        }
        write!(f, " :- {}", self.body)
    }
}

/// A compiled policy module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub package: Vec<String>,
    pub rules: Vec<Rule>,
}

impl Module {
    pub fn new(package: Vec<String>, rules: Vec<Rule>) -> Self {
        Self { package, rules }
    }

    /// First rule with the given name
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }
}
