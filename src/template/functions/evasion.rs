use std::fmt::Write as _;

use rand::Rng;

use crate::error::EvalResult;
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::encoding::query_escape;
use super::{arity, invalid, string_arg};

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "double_encode",
        signature: "$double_encode <string>",
        description: "URL-encodes the string twice.",
        call: double_encode,
    },
    Builtin {
        name: "unicode_encode",
        signature: "$unicode_encode <string>",
        description: "Escapes non-ASCII and control characters as \\uXXXX.",
        call: unicode_encode,
    },
    Builtin {
        name: "case_variation",
        signature: "$case_variation <string>",
        description: "Randomly flips the case of each letter.",
        call: case_variation,
    },
];

fn input<'arg>(function: &'static str, args: &'arg [Value]) -> EvalResult<&'arg str> {
    let [input] = args else {
        return Err(arity(function, "1", args));
    };
    string_arg(function, 1, input)
}

fn double_encode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = input("double_encode", args)?;
    Ok(Value::String(query_escape(&query_escape(input))))
}

fn unicode_encode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = input("unicode_encode", args)?;
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii() && !ch.is_control() {
            out.push(ch);
        } else {
            write!(out, "\\u{:04x}", u32::from(ch))
                .map_err(|err| invalid("unicode_encode", err.to_string()))?;
        }
    }
    Ok(Value::String(out))
}

fn case_variation(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = input("case_variation", args)?;
    let mut rng = rand::thread_rng();
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_alphabetic() && rng.gen_bool(0.5) {
            if ch.is_uppercase() {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
        } else {
            out.push(ch);
        }
    }
    Ok(Value::String(out))
}
