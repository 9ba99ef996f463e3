//! Built-in functions, grouped by purpose. Every group exposes a static
//! `BUILTINS` table that [`builtins`] concatenates for the registry.

mod body;
mod dictionary;
mod encoding;
mod evasion;
mod file;
mod random;
mod strings;
mod time;


use crate::error::EvalError;

use super::registry::Builtin;
use super::value::Value;

pub use body::encode_form;

pub fn builtins() -> impl Iterator<Item = Builtin> {
    [
        strings::BUILTINS,
        encoding::BUILTINS,
        evasion::BUILTINS,
        random::BUILTINS,
        time::BUILTINS,
        dictionary::BUILTINS,
        file::BUILTINS,
        body::BUILTINS,
    ]
    .into_iter()
    .flat_map(|group| group.iter().copied())
}

fn arity(function: &'static str, expected: &'static str, args: &[Value]) -> EvalError {
    EvalError::ArityMismatch {
        function,
        expected,
        actual: args.len(),
    }
}

fn mismatch(
    function: &'static str,
    position: usize,
    expected: &'static str,
    actual: &Value,
) -> EvalError {
    EvalError::ArgumentTypeMismatch {
        function,
        position,
        expected,
        actual: actual.type_name(),
    }
}

fn invalid(function: &'static str, reason: impl Into<String>) -> EvalError {
    EvalError::InvalidArgument {
        function,
        reason: reason.into(),
    }
}

fn string_arg<'arg>(
    function: &'static str,
    position: usize,
    value: &'arg Value,
) -> Result<&'arg str, EvalError> {
    value
        .as_str()
        .ok_or_else(|| mismatch(function, position, "a string", value))
}

fn int_arg(function: &'static str, position: usize, value: &Value) -> Result<i64, EvalError> {
    value
        .as_i64()
        .ok_or_else(|| mismatch(function, position, "an integer", value))
}

fn list_arg<'arg>(
    function: &'static str,
    position: usize,
    value: &'arg Value,
) -> Result<&'arg [Value], EvalError> {
    match value {
        Value::Sequence(items) => Ok(items),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Mapping(_) => {
            Err(mismatch(function, position, "a list", value))
        }
    }
}
