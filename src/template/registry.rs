use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{EvalResult, RegistryError};

use super::context::EvalContext;
use super::functions;
use super::value::Value;

/// A named callable reachable from a call node.
pub trait Function: Send + Sync {
    fn name(&self) -> &str;
    fn signature(&self) -> &str;
    fn description(&self) -> &str;

    /// Invokes the function with already evaluated arguments.
    ///
    /// # Errors
    ///
    /// Returns an `EvalError` when arity, argument types, or the function's
    /// own work (I/O, decoding) fail.
    fn call(&self, args: &[Value], ctx: &EvalContext<'_>) -> EvalResult<Value>;
}

pub type BuiltinFn = fn(&[Value], &EvalContext<'_>) -> EvalResult<Value>;

/// Static function table entry.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: &'static str,
    pub description: &'static str,
    pub call: BuiltinFn,
}

impl Function for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn signature(&self) -> &str {
        self.signature
    }

    fn description(&self) -> &str {
        self.description
    }

    fn call(&self, args: &[Value], ctx: &EvalContext<'_>) -> EvalResult<Value> {
        (self.call)(args, ctx)
    }
}

/// Function name to implementation table, built once and shared read-only.
#[derive(Clone, Default)]
pub struct Registry {
    functions: BTreeMap<String, Arc<dyn Function>>,
}

impl Registry {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for builtin in functions::builtins() {
            if let Err(err) = registry.register(builtin) {
                tracing::warn!("Skipping duplicate builtin function: {}", err);
            }
        }
        registry
    }

    /// Registers a function under its own name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` when the name is already taken.
    pub fn register<F>(&mut self, function: F) -> Result<(), RegistryError>
    where
        F: Function + 'static,
    {
        let name = function.name().to_owned();
        if self.functions.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.functions.insert(name, Arc::new(function));
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(Arc::as_ref)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn functions(&self) -> impl Iterator<Item = &dyn Function> {
        self.functions.values().map(Arc::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
