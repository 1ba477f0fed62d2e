//! Backtracking search over compiled bodies.

use super::bindings::Bindings;
use super::unify::unify;
use super::EvalError;
use crate::ast::{builtins, Body, Builtin, Expr, Module, Operator, Ref, Rule, Term, Value};
use crate::storage::{path, DataStore, Path, StorageError};
use std::cmp::Ordering;
use tracing::{debug, instrument, trace};

type Result<T> = std::result::Result<T, EvalError>;

/// Outcome of evaluating a rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The body produced no rows
    Undefined,
    /// Distinct head values in the order their rows were found
    Defined(Vec<Value>),
}

impl RuleOutcome {
    pub fn is_defined(&self) -> bool {
        matches!(self, RuleOutcome::Defined(_))
    }

    pub fn values(&self) -> &[Value] {
        match self {
            RuleOutcome::Defined(values) => values,
            RuleOutcome::Undefined => &[],
        }
    }
}

/// Evaluates bodies and rules against a document store.
///
/// Each call reads one snapshot of the store for its whole run; patches made
/// while the search is in flight are not observed.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    store: &'a DataStore,
    limit: Option<usize>,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store, limit: None }
    }

    /// Stop the search once `limit` rows have been produced
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate `body` starting from no bindings
    pub fn evaluate(&self, body: &Body) -> Result<Vec<Bindings>> {
        self.evaluate_with(body, &Bindings::new())
    }

    /// Evaluate `body` starting from `initial`.
    ///
    /// Returns one row per successful branch, in depth-first discovery order.
    #[instrument(skip_all, fields(exprs = body.len()))]
    pub fn evaluate_with(&self, body: &Body, initial: &Bindings) -> Result<Vec<Bindings>> {
        let exprs = body
            .iter()
            .map(|expr| builtin_for(expr).map(|builtin| (builtin, expr)))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::new();
        if self.limit == Some(0) {
            return Ok(rows);
        }

        let root = self.store.snapshot();
        let search = Search { root: &root };
        let mut worklist: Vec<Frame> = Vec::new();
        let mut ready = Some((0, initial.clone()));

        loop {
            if let Some((index, bindings)) = ready.take() {
                match exprs.get(index) {
                    Some(&(builtin, expr)) => {
                        let candidates = search.expand_all(&expr.args, &bindings)?;
                        trace!(index, candidates = candidates.len(), "Expression expanded");
                        worklist.push(Frame {
                            index,
                            builtin,
                            candidates: candidates.into_iter(),
                        });
                    }
                    None => {
                        rows.push(bindings);
                        if self.limit.is_some_and(|limit| rows.len() >= limit) {
                            debug!(rows = rows.len(), "Row limit reached");
                            break;
                        }
                    }
                }
            }

            let frame = match worklist.last_mut() {
                Some(frame) => frame,
                None => break,
            };
            match frame.candidates.next() {
                Some((args, b)) => {
                    if let Some(next) = apply(frame.builtin, &args, &b) {
                        ready = Some((frame.index + 1, next));
                    }
                }
                None => {
                    worklist.pop();
                }
            }
        }

        debug!(rows = rows.len(), "Evaluation complete");
        Ok(rows)
    }

    /// Evaluate a rule.
    ///
    /// Partial-set rules collect their head key per row, complete rules their
    /// head value (`true` when absent).
    #[instrument(skip_all, fields(rule = %rule.name()))]
    pub fn eval_rule(&self, rule: &Rule) -> Result<RuleOutcome> {
        let rows = self.evaluate(&rule.body)?;
        if rows.is_empty() {
            debug!("Rule undefined");
            return Ok(RuleOutcome::Undefined);
        }

        let head = rule.head.key.as_ref().or(rule.head.value.as_ref());
        let mut values: Vec<Value> = Vec::new();
        for row in &rows {
            let value = match head {
                Some(term) => row
                    .ground(term)
                    .ok_or_else(|| EvalError::NonGroundHead(rule.to_string()))?,
                None => Value::Boolean(true),
            };
            if !values.contains(&value) {
                values.push(value);
            }
        }

        debug!(values = values.len(), "Rule defined");
        Ok(RuleOutcome::Defined(values))
    }

    /// True if the rule body has at least one row
    pub fn is_defined(&self, rule: &Rule) -> Result<bool> {
        let first = Evaluator {
            limit: Some(1),
            ..*self
        };
        Ok(!first.evaluate(&rule.body)?.is_empty())
    }

    /// Evaluate every rule of a module, in order
    pub fn eval_module(&self, module: &Module) -> Result<Vec<(String, RuleOutcome)>> {
        module
            .rules
            .iter()
            .map(|rule| {
                self.eval_rule(rule)
                    .map(|outcome| (rule.name().to_string(), outcome))
            })
            .collect()
    }
}

/// An expression being tried: its candidates are applied one at a time,
/// so a row limit stops the search without applying the rest.
struct Frame {
    index: usize,
    builtin: &'static Builtin,
    candidates: std::vec::IntoIter<(Vec<Term>, Bindings)>,
}

fn builtin_for(expr: &Expr) -> Result<&'static Builtin> {
    let name = expr.operator.name();
    let builtin = builtins::lookup(name).ok_or_else(|| EvalError::UnknownBuiltin(name.to_string()))?;
    if expr.args.len() != builtin.num_args {
        return Err(EvalError::Arity {
            name: name.to_string(),
            expected: builtin.num_args,
            actual: expr.args.len(),
        });
    }
    Ok(builtin)
}

/// Per-evaluation state: the store snapshot.
struct Search<'r> {
    root: &'r Value,
}

impl<'r> Search<'r> {
    /// Cross product of the expansions of `terms`, left to right.
    ///
    /// Bindings made while expanding one position are visible to the next.
    fn expand_all<'t>(
        &self,
        terms: impl IntoIterator<Item = &'t Term>,
        bindings: &Bindings,
    ) -> Result<Vec<(Vec<Term>, Bindings)>> {
        let mut partial = vec![(Vec::new(), bindings.clone())];
        for term in terms {
            let mut next = Vec::new();
            for (prefix, b) in partial {
                for (expanded, extended) in self.expand(term, &b)? {
                    let mut row = prefix.clone();
                    row.push(expanded);
                    next.push((row, extended));
                }
            }
            if next.is_empty() {
                return Ok(next);
            }
            partial = next;
        }
        Ok(partial)
    }

    /// Rewrite `term` under `bindings`, resolving references.
    ///
    /// Unbound variables outside references are kept for unification.
    fn expand(&self, term: &Term, bindings: &Bindings) -> Result<Vec<(Term, Bindings)>> {
        match term {
            Term::Literal(_) => Ok(vec![(term.clone(), bindings.clone())]),
            Term::Var(var) => {
                let expanded = match bindings.get(var) {
                    Some(value) => Term::Literal(value.clone()),
                    None => term.clone(),
                };
                Ok(vec![(expanded, bindings.clone())])
            }
            Term::Ref(r) => Ok(self
                .resolve_ref(r, bindings)?
                .into_iter()
                .map(|(value, b)| (Term::Literal(value), b))
                .collect()),
            Term::Array(items) => Ok(self
                .expand_all(items, bindings)?
                .into_iter()
                .map(|(items, b)| (Term::Array(items), b))
                .collect()),
            Term::Object(pairs) => {
                let flat = self.expand_all(pairs.iter().flat_map(|(k, v)| [k, v]), bindings)?;
                Ok(flat
                    .into_iter()
                    .map(|(terms, b)| {
                        let mut terms = terms.into_iter();
                        let mut pairs = Vec::new();
                        while let (Some(k), Some(v)) = (terms.next(), terms.next()) {
                            pairs.push((k, v));
                        }
                        (Term::Object(pairs), b)
                    })
                    .collect())
            }
        }
    }

    fn resolve_ref(&self, r: &Ref, bindings: &Bindings) -> Result<Vec<(Value, Bindings)>> {
        let base = if r.base.is_data() {
            self.root
        } else {
            bindings
                .get(&r.base)
                .ok_or_else(|| EvalError::UnsafeReference(Term::Ref(r.clone()).to_string()))?
        };

        // Only a literal path from `data` can fail the whole evaluation.
        let mut out = Vec::new();
        self.walk(base, &r.segments, Path::root(), bindings, !r.base.is_data(), &mut out)?;
        Ok(out)
    }

    /// Follow `segments` from `current`, collecting every value reached.
    ///
    /// An unbound variable segment fans out over the elements of `current`.
    /// Once any segment is not a literal, every lookup failure prunes the
    /// candidate; along a literal prefix only "not found" failures prune.
    fn walk(
        &self,
        current: &Value,
        segments: &[Term],
        prefix: Path,
        bindings: &Bindings,
        iterated: bool,
        out: &mut Vec<(Value, Bindings)>,
    ) -> Result<()> {
        let (segment, rest) = match segments.split_first() {
            Some(split) => split,
            None => {
                out.push((current.clone(), bindings.clone()));
                return Ok(());
            }
        };

        if let Term::Var(var) = segment {
            if !bindings.is_bound(var) {
                match current {
                    Value::Array(items) => {
                        for (i, item) in items.iter().enumerate() {
                            let key = Value::from(i);
                            if let Some(next) = bindings.bind(var, key.clone()) {
                                self.walk(item, rest, prefix.child(key), &next, true, out)?;
                            }
                        }
                    }
                    Value::Object(obj) => {
                        for (k, item) in obj {
                            let key = Value::from(k.as_str());
                            if let Some(next) = bindings.bind(var, key.clone()) {
                                self.walk(item, rest, prefix.child(key), &next, true, out)?;
                            }
                        }
                    }
                    _ => trace!(path = %prefix, "Nothing to iterate"),
                }
                return Ok(());
            }
        }

        for (term, next) in self.expand(segment, bindings)? {
            let key = next
                .ground(&term)
                .ok_or_else(|| EvalError::NonGroundSegment(segment.to_string()))?;
            let iterated = iterated || !matches!(segment, Term::Literal(_));

            match path::step(current, &key) {
                Ok(value) => self.walk(value, rest, prefix.child(key), &next, iterated, out)?,
                Err(kind) if iterated || kind.is_not_found() => {
                    trace!(path = %prefix, %kind, "Branch pruned");
                }
                Err(kind) => return Err(StorageError::new(prefix.child(key), kind).into()),
            }
        }
        Ok(())
    }
}

/// Run one builtin over fully expanded arguments.
fn apply(builtin: &Builtin, args: &[Term], bindings: &Bindings) -> Option<Bindings> {
    let (lhs, rhs) = match args {
        [lhs, rhs] => (lhs, rhs),
        _ => return None,
    };

    if builtin.is_unifying() {
        let ready = args.iter().enumerate().all(|(pos, arg)| {
            builtin.unifies_recursively(pos)
                || (builtin.unifies(pos) && matches!(arg, Term::Var(_)))
                || bindings.ground(arg).is_some()
        });
        return if ready { unify(lhs, rhs, bindings) } else { None };
    }

    let lhs = bindings.ground(lhs)?;
    let rhs = bindings.ground(rhs)?;
    predicate(builtin.operator, &lhs, &rhs).then(|| bindings.clone())
}

fn predicate(op: Operator, lhs: &Value, rhs: &Value) -> bool {
    let ord = lhs.compare(rhs);
    match op {
        Operator::Equality => lhs == rhs,
        Operator::NotEqual => lhs != rhs,
        Operator::GreaterThan => ord == Some(Ordering::Greater),
        Operator::GreaterThanEq => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        Operator::LessThan => ord == Some(Ordering::Less),
        Operator::LessThanEq => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ErrorKind;
    use serde_json::json;

    fn store() -> DataStore {
        DataStore::from_json(json!({
            "a": [
                {"b": {"c": [true, 2, false]}},
                {"b": {"c": [false, true, 1]}}
            ]
        }))
        .unwrap()
    }

    fn abc(i: Term, j: Term) -> Term {
        Term::data_ref(vec![Term::lit("a"), i, Term::lit("b"), Term::lit("c"), j])
    }

    fn rows_json(rows: &[Bindings]) -> Vec<serde_json::Value> {
        rows.iter().map(Bindings::to_json).collect()
    }

    #[test]
    fn test_iterates_nested_references() {
        let store = store();
        let body = Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::lit(2))]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(rows_json(&rows), vec![json!({"i": 0, "j": 1})]);
    }

    #[test]
    fn test_no_match_yields_no_rows() {
        let store = store();
        let body = Body::new(vec![Expr::eq(
            abc(Term::var("i"), Term::var("j")),
            Term::lit("deadbeef"),
        )]);
        assert!(Evaluator::new(&store).evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_rows_in_depth_first_order() {
        let store = store();
        let body = Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::var("x"))]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(
            rows_json(&rows),
            vec![
                json!({"i": 0, "j": 0, "x": true}),
                json!({"i": 0, "j": 1, "x": 2}),
                json!({"i": 0, "j": 2, "x": false}),
                json!({"i": 1, "j": 0, "x": false}),
                json!({"i": 1, "j": 1, "x": true}),
                json!({"i": 1, "j": 2, "x": 1}),
            ]
        );
    }

    #[test]
    fn test_bindings_flow_into_later_expressions() {
        let store = store();
        let body = Body::new(vec![
            Expr::eq(abc(Term::var("i"), Term::var("j")), Term::var("x")),
            Expr::eq(Term::var("x"), Term::lit(true)),
        ]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(
            rows_json(&rows),
            vec![json!({"i": 0, "j": 0, "x": true}), json!({"i": 1, "j": 1, "x": true})]
        );
    }

    #[test]
    fn test_object_keys_iterate_in_ascending_order() {
        let store = DataStore::from_json(json!({"m": {"z": 1, "a": 2}})).unwrap();
        let body = Body::new(vec![Expr::eq(
            Term::data_ref(vec![Term::lit("m"), Term::var("k")]),
            Term::var("v"),
        )]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(
            rows_json(&rows),
            vec![json!({"k": "a", "v": 2}), json!({"k": "z", "v": 1})]
        );
    }

    #[test]
    fn test_ground_expressions_short_circuit() {
        let store = store();
        let eval = Evaluator::new(&store);

        let rows = eval.evaluate(&Body::new(vec![Expr::lt(Term::lit(1), Term::lit(2))])).unwrap();
        assert_eq!(rows, vec![Bindings::new()]);

        let body = Body::new(vec![
            Expr::gt(Term::lit(1), Term::lit(2)),
            Expr::eq(abc(Term::var("i"), Term::var("j")), Term::var("x")),
        ]);
        assert!(eval.evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_comparisons() {
        let store = store();
        let eval = Evaluator::new(&store);
        let holds = |expr: Expr| !eval.evaluate(&Body::new(vec![expr])).unwrap().is_empty();

        assert!(holds(Expr::gte(Term::lit(2), Term::lit(2))));
        assert!(holds(Expr::lte(Term::lit("a"), Term::lit("b"))));
        assert!(holds(Expr::neq(Term::lit(1), Term::lit("1"))));
        assert!(!holds(Expr::neq(Term::lit(1), Term::lit(1.0))));
        assert!(!holds(Expr::lt(Term::lit(1), Term::lit("2"))));
        // Comparisons never bind.
        assert!(!holds(Expr::gt(Term::var("x"), Term::lit(1))));
    }

    #[test]
    fn test_comparison_filters_iteration() {
        let store = DataStore::from_json(json!({"n": [5, 1, 7, 3]})).unwrap();
        let body = Body::new(vec![
            Expr::eq(Term::data_ref(vec![Term::lit("n"), Term::var("i")]), Term::var("x")),
            Expr::gt(Term::var("x"), Term::lit(3)),
        ]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(
            rows_json(&rows),
            vec![json!({"i": 0, "x": 5}), json!({"i": 2, "x": 7})]
        );
    }

    #[test]
    fn test_variable_based_reference() {
        let store = store();
        let body = Body::new(vec![
            Expr::eq(Term::var("x"), Term::data_ref(vec![Term::lit("a"), Term::lit(0)])),
            Expr::eq(
                Term::reference("x", vec![Term::lit("b"), Term::lit("c"), Term::var("j")]),
                Term::lit(2),
            ),
        ]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(&"j".into()), Some(&Value::from(1)));
    }

    #[test]
    fn test_unbound_reference_base_is_an_error() {
        let store = store();
        let body = Body::new(vec![Expr::eq(
            Term::reference("x", vec![Term::lit("b")]),
            Term::lit(1),
        )]);
        let err = Evaluator::new(&store).evaluate(&body).unwrap_err();
        assert!(matches!(err, EvalError::UnsafeReference(_)));
    }

    #[test]
    fn test_nested_reference_in_segment() {
        let store = DataStore::from_json(json!({"idx": 1, "xs": ["p", "q"]})).unwrap();
        let body = Body::new(vec![Expr::eq(
            Term::data_ref(vec![Term::lit("xs"), Term::data_ref(vec![Term::lit("idx")])]),
            Term::var("v"),
        )]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(rows_json(&rows), vec![json!({"v": "q"})]);
    }

    #[test]
    fn test_missing_prefix_prunes() {
        let store = store();
        let body = Body::new(vec![Expr::eq(
            Term::data_ref(vec![Term::lit("missing"), Term::var("i")]),
            Term::var("x"),
        )]);
        assert!(Evaluator::new(&store).evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_prefix_is_an_error() {
        let store = store();
        let body = Body::new(vec![Expr::eq(
            Term::data_ref(vec![Term::lit("a"), Term::lit("x")]),
            Term::var("v"),
        )]);
        let err = Evaluator::new(&store).evaluate(&body).unwrap_err();
        match err {
            EvalError::Storage(e) => {
                assert_eq!(e.kind, ErrorKind::ArrayIndexType(Value::from("x")));
                assert_eq!(e.path.to_string(), "a.x");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_failures_below_iteration_prune() {
        let store = store();
        // c is an array, so "foo" is a bad index, but only below `i`.
        let body = Body::new(vec![Expr::eq(
            Term::data_ref(vec![
                Term::lit("a"),
                Term::var("i"),
                Term::lit("b"),
                Term::lit("c"),
                Term::lit("foo"),
            ]),
            Term::var("v"),
        )]);
        assert!(Evaluator::new(&store).evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_bad_bound_index_prunes() {
        // "x" is not an index into `vals`, but it came from a variable.
        let store = DataStore::from_json(json!({"keys": ["x", 1], "vals": [10, 20]})).unwrap();
        let body = Body::new(vec![
            Expr::eq(Term::data_ref(vec![Term::lit("keys"), Term::var("i")]), Term::var("k")),
            Expr::eq(Term::data_ref(vec![Term::lit("vals"), Term::var("k")]), Term::var("v")),
        ]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(rows_json(&rows), vec![json!({"i": 1, "k": 1, "v": 20})]);
    }

    #[test]
    fn test_bad_bound_key_prunes() {
        let store = DataStore::from_json(json!({"ks": [1, "b"], "obj": {"b": 2}, "n": 3})).unwrap();
        let body = Body::new(vec![
            Expr::eq(Term::data_ref(vec![Term::lit("ks"), Term::var("i")]), Term::var("k")),
            Expr::eq(Term::data_ref(vec![Term::lit("obj"), Term::var("k")]), Term::var("v")),
        ]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(rows_json(&rows), vec![json!({"i": 1, "k": "b", "v": 2})]);

        // A scalar reached through a bound variable.
        let body = Body::new(vec![
            Expr::eq(Term::var("k"), Term::lit("n")),
            Expr::eq(Term::data_ref(vec![Term::var("k"), Term::lit(0)]), Term::var("v")),
        ]);
        assert!(Evaluator::new(&store).evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_bad_lookup_on_variable_base_prunes() {
        let store = store();
        let body = Body::new(vec![
            Expr::eq(Term::var("x"), Term::data_ref(vec![Term::lit("a")])),
            Expr::eq(Term::reference("x", vec![Term::lit("b")]), Term::var("v")),
        ]);
        assert!(Evaluator::new(&store).evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_builtin_and_arity() {
        let store = store();
        let eval = Evaluator::new(&store);

        let body = Body::new(vec![Expr::new("~", vec![Term::lit(1), Term::lit(1)])]);
        assert_eq!(eval.evaluate(&body).unwrap_err(), EvalError::UnknownBuiltin("~".into()));

        let body = Body::new(vec![Expr::new("=", vec![Term::lit(1)])]);
        assert_eq!(
            eval.evaluate(&body).unwrap_err(),
            EvalError::Arity {
                name: "=".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_structural_equality_against_store() {
        let store = DataStore::from_json(json!({"h": [[1, 2, 3], [2, 3, 4]]})).unwrap();
        let body = Body::new(vec![Expr::eq(
            Term::array(vec![Term::var("x"), Term::lit(3), Term::var("y")]),
            Term::data_ref(vec![Term::lit("h"), Term::var("i")]),
        )]);
        let rows = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(rows_json(&rows), vec![json!({"i": 1, "x": 2, "y": 4})]);
    }

    #[test]
    fn test_row_limit() {
        let store = store();
        let body = Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::var("x"))]);
        let rows = Evaluator::new(&store).with_limit(2).evaluate(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].to_json(), json!({"i": 0, "j": 1, "x": 2}));
        assert!(Evaluator::new(&store).with_limit(0).evaluate(&body).unwrap().is_empty());
    }

    #[test]
    fn test_row_limit_keeps_discovery_order() {
        let store = DataStore::from_json(json!({"n": [5, 1, 7, 3, 9]})).unwrap();
        let body = Body::new(vec![
            Expr::eq(Term::data_ref(vec![Term::lit("n"), Term::var("i")]), Term::var("x")),
            Expr::gt(Term::var("x"), Term::lit(3)),
            Expr::eq(Term::data_ref(vec![Term::lit("n"), Term::var("j")]), Term::var("x")),
        ]);
        let all = Evaluator::new(&store).evaluate(&body).unwrap();
        assert_eq!(all.len(), 3);
        for limit in 1..=4 {
            let rows = Evaluator::new(&store).with_limit(limit).evaluate(&body).unwrap();
            assert_eq!(rows, all[..limit.min(all.len())].to_vec());
        }
    }

    #[test]
    fn test_initial_bindings() {
        let store = store();
        let body = Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::var("x"))]);
        let initial = Bindings::new().bind(&"i".into(), Value::from(1)).unwrap();
        let rows = Evaluator::new(&store).evaluate_with(&body, &initial).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.get(&"i".into()) == Some(&Value::from(1))));
    }

    #[test]
    fn test_rules() {
        let store = store();
        let eval = Evaluator::new(&store);

        let p = Rule::partial_set(
            "p",
            Term::var("x"),
            Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::var("x"))]),
        );
        assert!(eval.is_defined(&p).unwrap());
        assert_eq!(
            eval.eval_rule(&p).unwrap(),
            RuleOutcome::Defined(vec![Value::from(true), Value::from(2), Value::from(false), Value::from(1)])
        );

        let q = Rule::complete(
            "q",
            Term::lit("yes"),
            Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::lit(1))]),
        );
        assert_eq!(eval.eval_rule(&q).unwrap().values(), &[Value::from("yes")]);

        let r = Rule::partial_set(
            "r",
            Term::var("x"),
            Body::new(vec![Expr::eq(abc(Term::var("i"), Term::var("j")), Term::lit("deadbeef"))]),
        );
        assert_eq!(eval.eval_rule(&r).unwrap(), RuleOutcome::Undefined);
        assert!(!eval.is_defined(&r).unwrap());

        let module = Module::new(vec!["test".into()], vec![p, q, r]);
        let outcomes = eval.eval_module(&module).unwrap();
        let names: Vec<_> = outcomes.iter().map(|(name, o)| (name.as_str(), o.is_defined())).collect();
        assert_eq!(names, vec![("p", true), ("q", true), ("r", false)]);
    }

    #[test]
    fn test_non_ground_head() {
        let store = store();
        let rule = Rule::partial_set(
            "p",
            Term::var("unbound"),
            Body::new(vec![Expr::eq(Term::lit(1), Term::lit(1))]),
        );
        let err = Evaluator::new(&store).eval_rule(&rule).unwrap_err();
        assert!(matches!(err, EvalError::NonGroundHead(_)));
    }
}
