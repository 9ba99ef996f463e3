use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{EvalError, EvalResult};

use super::context::{Bindings, EvalContext};
use super::eval::{Evaluator, call_target};
use super::value::{Mapping, Value};

/// Resolves a set of mutually referencing variable definitions.
///
/// Static `var` references (a literal name) form a dependency graph that is
/// walked in topological order, so declaration order never matters. A
/// variable whose name is computed at evaluation time is retried after other
/// variables resolve. Whatever remains blocked is reported together.
pub struct VariableResolver<'eval> {
    evaluator: &'eval Evaluator,
}

impl<'eval> VariableResolver<'eval> {
    #[must_use]
    pub const fn new(evaluator: &'eval Evaluator) -> Self {
        Self { evaluator }
    }

    /// Resolves `variables` on top of `seed`. Seed entries win over
    /// same-named definitions and are included in the result.
    ///
    /// # Errors
    ///
    /// Returns `CircularOrUndefinedReference` naming every variable that
    /// could not be resolved, or the first evaluation error of a variable
    /// whose dependencies were all available.
    pub fn resolve_all(
        &self,
        variables: &Mapping,
        seed: &Bindings,
        source: Option<&Path>,
    ) -> EvalResult<Bindings> {
        let pending: BTreeMap<&str, &Value> = variables
            .iter()
            .filter(|(name, _)| !seed.contains_key(name.as_str()))
            .map(|(name, value)| (name.as_str(), value))
            .collect();

        let mut blocked: BTreeSet<&str> = BTreeSet::new();
        let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (&name, value) in &pending {
            let mut refs = BTreeSet::new();
            collect_references(value, &mut refs);
            let mut count: usize = 0;
            for reference in refs {
                if reference == name {
                    blocked.insert(name);
                } else if let Some((&dep, _)) = pending.get_key_value(reference) {
                    dependents.entry(dep).or_default().push(name);
                    count = count.saturating_add(1);
                } else if !seed.contains_key(reference) {
                    blocked.insert(name);
                }
            }
            indegree.insert(name, count);
        }

        let mut ready: BTreeSet<&str> = indegree
            .iter()
            .filter(|(name, count)| **count == 0 && !blocked.contains(*name))
            .map(|(name, _)| *name)
            .collect();
        let mut deferred: Vec<&str> = Vec::new();
        let mut progressed = false;
        let mut resolved = seed.clone();

        loop {
            let Some(name) = ready.pop_first() else {
                if progressed && !deferred.is_empty() {
                    ready.extend(deferred.drain(..));
                    progressed = false;
                    continue;
                }
                break;
            };
            let Some(value) = pending.get(name) else {
                continue;
            };
            let ctx = EvalContext::new(&resolved, source);
            match self.evaluator.evaluate(value, &ctx) {
                Ok(result) => {
                    resolved.insert(name.to_owned(), result);
                    progressed = true;
                    for dependent in dependents.get(name).into_iter().flatten() {
                        if let Some(count) = indegree.get_mut(dependent) {
                            *count = count.saturating_sub(1);
                            if *count == 0 && !blocked.contains(dependent) {
                                ready.insert(*dependent);
                            }
                        }
                    }
                }
                Err(EvalError::UndefinedVariable { .. }) => deferred.push(name),
                Err(err) => return Err(err),
            }
        }

        let stuck: Vec<String> = pending
            .keys()
            .filter(|name| !resolved.contains_key(**name))
            .map(|name| (*name).to_owned())
            .collect();
        if !stuck.is_empty() {
            return Err(EvalError::CircularOrUndefinedReference { names: stuck });
        }
        Ok(resolved)
    }
}

/// Names referenced by `var` calls whose argument is a literal string.
fn collect_references<'val>(value: &'val Value, refs: &mut BTreeSet<&'val str>) {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        Value::Sequence(items) => {
            for item in items {
                collect_references(item, refs);
            }
        }
        Value::Mapping(entries) => {
            if let Some(("var", args)) = call_target(entries) {
                match args {
                    Value::String(name) => {
                        refs.insert(name);
                        return;
                    }
                    Value::Sequence(items) => {
                        if let [Value::String(name)] = items.as_slice() {
                            refs.insert(name);
                            return;
                        }
                    }
                    Value::Null | Value::Bool(_) | Value::Number(_) | Value::Mapping(_) => {}
                }
            }
            for item in entries.values() {
                collect_references(item, refs);
            }
        }
    }
}
