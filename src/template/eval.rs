use std::sync::Arc;

use crate::error::{EvalError, EvalResult};

use super::context::EvalContext;
use super::registry::Registry;
use super::value::{Mapping, Value};

/// Key prefixes that turn a single-entry mapping into a function call.
/// `$name` is the JSON spelling, `!name` what YAML tags produce.
pub const CALL_SIGILS: [char; 2] = ['$', '!'];

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Function name and raw argument of a call node, or `None` for data.
#[must_use]
pub fn call_target(entries: &Mapping) -> Option<(&str, &Value)> {
    let mut iter = entries.iter();
    let (key, args) = iter.next()?;
    if iter.next().is_some() {
        return None;
    }
    key.strip_prefix(CALL_SIGILS).map(|name| (name, args))
}

/// Recursive tree walker resolving call nodes through a shared registry.
#[derive(Clone)]
pub struct Evaluator {
    registry: Arc<Registry>,
    max_depth: usize,
}

impl Evaluator {
    #[must_use]
    pub const fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves every call node in `value`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFunction` for unregistered call names, `DepthExceeded`
    /// when nesting passes the configured limit, and whatever a called
    /// function reports.
    pub fn evaluate(&self, value: &Value, ctx: &EvalContext<'_>) -> EvalResult<Value> {
        self.eval_at(value, ctx, 0)
    }

    fn eval_at(&self, value: &Value, ctx: &EvalContext<'_>, depth: usize) -> EvalResult<Value> {
        if depth > self.max_depth {
            return Err(EvalError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        let next = depth.saturating_add(1);
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Ok(value.clone())
            }
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.eval_at(item, ctx, next))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Sequence),
            Value::Mapping(entries) => match call_target(entries) {
                Some((name, raw_args)) => self.call(name, raw_args, ctx, next),
                None => entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.eval_at(item, ctx, next)?)))
                    .collect::<EvalResult<Mapping>>()
                    .map(Value::Mapping),
            },
        }
    }

    fn call(
        &self,
        name: &str,
        raw_args: &Value,
        ctx: &EvalContext<'_>,
        depth: usize,
    ) -> EvalResult<Value> {
        let function = self
            .registry
            .lookup(name)
            .ok_or_else(|| EvalError::UnknownFunction {
                name: name.to_owned(),
            })?;
        let args = match raw_args {
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.eval_at(item, ctx, depth))
                .collect::<EvalResult<Vec<_>>>()?,
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Mapping(_) => vec![self.eval_at(raw_args, ctx, depth)?],
        };
        tracing::trace!("Calling {} with {} argument(s)", name, args.len());
        function.call(&args, ctx)
    }
}
