use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, Utc};

use crate::error::EvalResult;
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::{arity, invalid, string_arg};

const DEFAULT_DATE: &str = "%Y-%m-%d";
const DEFAULT_TIME: &str = "%H:%M:%S";

// Reference-layout tokens, longest first so `2006` wins over `06`.
const LAYOUT_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Monday", "%A"),
    ("Z07:00", "%:z"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("2006", "%Y"),
    (".000", "%.3f"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("PM", "%p"),
    ("01", "%m"),
    ("02", "%d"),
    ("_2", "%e"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
];

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "timestamp",
        signature: "$timestamp []",
        description: "Current Unix time in seconds.",
        call: timestamp,
    },
    Builtin {
        name: "date",
        signature: "$date [format?]",
        description: "Current local date (default YYYY-MM-DD).",
        call: date,
    },
    Builtin {
        name: "time",
        signature: "$time [format?]",
        description: "Current local time (default HH:MM:SS).",
        call: time,
    },
];

fn timestamp(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    if !args.is_empty() {
        return Err(arity("timestamp", "0", args));
    }
    Ok(Value::from(Utc::now().timestamp()))
}

fn date(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    format_now("date", args, DEFAULT_DATE)
}

fn time(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    format_now("time", args, DEFAULT_TIME)
}

fn format_now(function: &'static str, args: &[Value], default: &str) -> EvalResult<Value> {
    let format = match args {
        [] => default.to_owned(),
        [format] => to_strftime(string_arg(function, 1, format)?),
        _ => return Err(arity(function, "0 or 1", args)),
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid(function, format!("invalid format '{format}'")));
    }
    let mut out = String::new();
    write!(out, "{}", Local::now().format_with_items(items.iter()))
        .map_err(|_err| invalid(function, format!("cannot render format '{format}'")))?;
    Ok(Value::String(out))
}

/// Formats containing `%` are strftime already; anything else is read as a
/// `2006-01-02 15:04:05` style reference layout.
pub(super) fn to_strftime(format: &str) -> String {
    if format.contains('%') {
        return format.to_owned();
    }
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    'scan: while let Some(ch) = rest.chars().next() {
        for (token, replacement) in LAYOUT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = rest.get(ch.len_utf8()..).unwrap_or_default();
    }
    out
}
