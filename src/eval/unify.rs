//! Structural unification.
//!
//! `unify` makes two terms equal by binding free variables, recursing into
//! arrays and objects of matching shape. It yields at most one extended
//! binding set; `None` is an ordinary non-match, never an error.
//!
//! References must already be resolved to literals by the evaluator.

use super::bindings::Bindings;
use crate::ast::{Term, Value, Var};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Unify `a` and `b` under `bindings`.
pub fn unify(a: &Term, b: &Term, bindings: &Bindings) -> Option<Bindings> {
    let a = deref(a, bindings);
    let b = deref(b, bindings);

    match (a.as_ref(), b.as_ref()) {
        (Term::Var(x), Term::Var(y)) => {
            // Two distinct free variables cannot be bound to a value.
            (x == y).then(|| bindings.clone())
        }
        (Term::Var(x), other) | (other, Term::Var(x)) => bind(x, other, bindings),
        (Term::Ref(_), _) | (_, Term::Ref(_)) => None,
        (Term::Literal(x), Term::Literal(y)) => (x == y).then(|| bindings.clone()),
        (Term::Array(xs), Term::Array(ys)) => {
            if xs.len() != ys.len() {
                return None;
            }
            unify_pairs(xs.iter().zip(ys.iter()).map(|(x, y)| (x, Cow::Borrowed(y))), bindings)
        }
        (Term::Array(xs), Term::Literal(Value::Array(vs)))
        | (Term::Literal(Value::Array(vs)), Term::Array(xs)) => {
            if xs.len() != vs.len() {
                return None;
            }
            unify_pairs(
                xs.iter().zip(vs.iter()).map(|(x, v)| (x, Cow::Owned(Term::Literal(v.clone())))),
                bindings,
            )
        }
        (Term::Object(xs), Term::Object(ys)) => {
            let xs = object_pattern(xs, bindings)?;
            let ys = object_pattern(ys, bindings)?;
            if !same_keys(&xs, &ys) {
                return None;
            }
            unify_pairs(
                xs.iter().map(|(k, x)| (*x, Cow::Borrowed(ys[k]))),
                bindings,
            )
        }
        (Term::Object(xs), Term::Literal(Value::Object(vs)))
        | (Term::Literal(Value::Object(vs)), Term::Object(xs)) => {
            let xs = object_pattern(xs, bindings)?;
            if !same_keys(&xs, vs) {
                return None;
            }
            unify_pairs(
                xs.iter().map(|(k, x)| (*x, Cow::Owned(Term::Literal(vs[k].clone())))),
                bindings,
            )
        }
        _ => None,
    }
}

/// Replace a bound variable by its value.
fn deref<'a>(term: &'a Term, bindings: &Bindings) -> Cow<'a, Term> {
    match term {
        Term::Var(v) => match bindings.get(v) {
            Some(value) => Cow::Owned(Term::Literal(value.clone())),
            None => Cow::Borrowed(term),
        },
        _ => Cow::Borrowed(term),
    }
}

/// Bind a free variable to the fully resolved other side.
fn bind(var: &Var, other: &Term, bindings: &Bindings) -> Option<Bindings> {
    let value = bindings.ground(other)?;
    bindings.bind(var, value)
}

fn unify_pairs<'a, I>(pairs: I, bindings: &Bindings) -> Option<Bindings>
where
    I: Iterator<Item = (&'a Term, Cow<'a, Term>)>,
{
    let mut current = bindings.clone();
    for (x, y) in pairs {
        current = unify(x, &y, &current)?;
    }
    Some(current)
}

/// Index an object term by its (ground, string) keys.
///
/// A repeated key makes the pattern unmatchable.
fn object_pattern<'a>(pairs: &'a [(Term, Term)], bindings: &Bindings) -> Option<BTreeMap<String, &'a Term>> {
    let mut map = BTreeMap::new();
    for (k, v) in pairs {
        match bindings.ground(k)? {
            Value::String(key) => {
                if map.insert(key, v).is_some() {
                    return None;
                }
            }
            _ => return None,
        }
    }
    Some(map)
}

fn same_keys<A, B>(a: &BTreeMap<String, A>, b: &BTreeMap<String, B>) -> bool {
    a.len() == b.len() && a.keys().zip(b.keys()).all(|(x, y)| x == y)
}
