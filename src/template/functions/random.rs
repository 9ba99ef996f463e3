use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::EvalResult;
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::{arity, int_arg, invalid, string_arg};

const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "random",
        signature: "$random <max>",
        description: "Random integer in [0, max).",
        call: random,
    },
    Builtin {
        name: "random_string",
        signature: "$random_string [length, charset?]",
        description: "Random string drawn from the charset (alphanumeric by default).",
        call: random_string,
    },
    Builtin {
        name: "uuid",
        signature: "$uuid []",
        description: "Random version 4 UUID.",
        call: uuid,
    },
];

fn random(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [max] = args else {
        return Err(arity("random", "1", args));
    };
    let max = int_arg("random", 1, max)?;
    if max <= 0 {
        return Err(invalid("random", format!("max must be positive, got {max}")));
    }
    Ok(Value::from(rand::thread_rng().gen_range(0..max)))
}

fn random_string(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let (length, charset) = match args {
        [length] => (int_arg("random_string", 1, length)?, ALPHANUMERIC),
        [length, charset] => (
            int_arg("random_string", 1, length)?,
            string_arg("random_string", 2, charset)?,
        ),
        _ => return Err(arity("random_string", "1 or 2", args)),
    };
    let length = usize::try_from(length)
        .ok()
        .filter(|length| *length > 0)
        .ok_or_else(|| invalid("random_string", format!("length must be positive, got {length}")))?;
    let chars: Vec<char> = charset.chars().collect();
    if chars.is_empty() {
        return Err(invalid("random_string", "charset must not be empty"));
    }

    let mut rng = rand::thread_rng();
    let out: String = (0..length)
        .filter_map(|_| chars.choose(&mut rng).copied())
        .collect();
    Ok(Value::String(out))
}

fn uuid(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    if !args.is_empty() {
        return Err(arity("uuid", "0", args));
    }
    Ok(Value::String(::uuid::Uuid::new_v4().to_string()))
}
