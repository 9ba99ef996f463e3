use crate::error::{EvalError, EvalResult};
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::{arity, string_arg};

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "var",
        signature: "$var <name>",
        description: "Value bound to a template, dictionary or CLI variable.",
        call: var,
    },
    Builtin {
        name: "concat",
        signature: "$concat [value, ...]",
        description: "Concatenates the text form of every argument.",
        call: concat,
    },
    Builtin {
        name: "join",
        signature: "$join [separator, value, ...]",
        description: "Joins values with a separator.",
        call: join,
    },
    Builtin {
        name: "concat_arrays",
        signature: "$concat_arrays [array, ...]",
        description: "Flattens arrays (and scalars) into one string list.",
        call: concat_arrays,
    },
];

fn var(args: &[Value], ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [name] = args else {
        return Err(arity("var", "1", args));
    };
    let name = string_arg("var", 1, name)?;
    ctx.lookup(name)
        .cloned()
        .ok_or_else(|| EvalError::UndefinedVariable {
            name: name.to_owned(),
        })
}

fn concat(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    Ok(Value::String(args.iter().map(Value::to_text).collect()))
}

fn join(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [separator, values @ ..] = args else {
        return Err(arity("join", "at least 2", args));
    };
    if values.is_empty() {
        return Err(arity("join", "at least 2", args));
    }
    let separator = string_arg("join", 1, separator)?;
    let parts: Vec<String> = values.iter().map(Value::to_text).collect();
    Ok(Value::String(parts.join(separator)))
}

fn concat_arrays(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let mut items = Vec::new();
    for arg in args {
        match arg {
            Value::Sequence(values) => items.extend(values.iter().map(Value::to_text)),
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Mapping(_) => items.push(arg.to_text()),
        }
    }
    Ok(Value::from(items))
}
