use url::form_urlencoded;

use crate::error::EvalResult;
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::{Mapping, Value};

use super::{arity, int_arg, invalid, mismatch, string_arg};

const MAX_BOUNDARY_LEN: usize = 70;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "form",
        signature: "$form <mapping>",
        description: "application/x-www-form-urlencoded text; null entries are dropped.",
        call: form,
    },
    Builtin {
        name: "json",
        signature: "$json [value, indent?]",
        description: "JSON text, indented by a space count or indent string when given.",
        call: json,
    },
    Builtin {
        name: "multipart",
        signature: "$multipart [mapping, boundary]",
        description: "multipart/form-data text with the given boundary; null entries are dropped.",
        call: multipart,
    },
];

/// Form-encodes a mapping in key order. Null entries are skipped and
/// sequences repeat their key once per element.
#[must_use]
pub fn encode_form(entries: &Mapping) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in entries {
        match value {
            Value::Null => {}
            Value::Sequence(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    serializer.append_pair(key, &item.to_text());
                }
            }
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Mapping(_) => {
                serializer.append_pair(key, &value.to_text());
            }
        }
    }
    serializer.finish()
}

fn mapping_arg<'arg>(
    function: &'static str,
    position: usize,
    value: &'arg Value,
) -> EvalResult<&'arg Mapping> {
    match value {
        Value::Mapping(entries) => Ok(entries),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Sequence(_) => {
            Err(mismatch(function, position, "a mapping", value))
        }
    }
}

fn form(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [entries] = args else {
        return Err(arity("form", "1", args));
    };
    Ok(Value::String(encode_form(mapping_arg("form", 1, entries)?)))
}

fn json(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let (value, indent) = match args {
        [value] => (value, None),
        [value, indent] => {
            let indent = match indent {
                Value::String(indent) => indent.clone(),
                Value::Number(_) => {
                    let width = usize::try_from(int_arg("json", 2, indent)?)
                        .map_err(|_err| invalid("json", "indent width must not be negative"))?;
                    " ".repeat(width)
                }
                Value::Null | Value::Bool(_) | Value::Sequence(_) | Value::Mapping(_) => {
                    return Err(mismatch("json", 2, "an integer or a string", indent));
                }
            };
            (value, Some(indent))
        }
        _ => return Err(arity("json", "1 or 2", args)),
    };

    let Some(indent) = indent else {
        let text = serde_json::to_string(value).map_err(|err| invalid("json", err.to_string()))?;
        return Ok(Value::String(text));
    };
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(value, &mut serializer)
        .map_err(|err| invalid("json", err.to_string()))?;
    let text = String::from_utf8(buf).map_err(|err| invalid("json", err.to_string()))?;
    Ok(Value::String(text))
}

fn multipart(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [entries, boundary] = args else {
        return Err(arity("multipart", "2", args));
    };
    let entries = mapping_arg("multipart", 1, entries)?;
    let boundary = string_arg("multipart", 2, boundary)?;
    validate_boundary(boundary)?;

    let mut out = String::new();
    for (key, value) in entries.iter().filter(|(_, value)| !value.is_null()) {
        out.push_str(if out.is_empty() { "--" } else { "\r\n--" });
        out.push_str(boundary);
        out.push_str("\r\nContent-Disposition: form-data; name=\"");
        out.push_str(&key.replace('\\', "\\\\").replace('"', "\\\""));
        out.push_str("\"\r\n\r\n");
        out.push_str(&value.to_text());
    }
    out.push_str(if out.is_empty() { "--" } else { "\r\n--" });
    out.push_str(boundary);
    out.push_str("--\r\n");
    Ok(Value::String(out))
}

fn validate_boundary(boundary: &str) -> EvalResult<()> {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
        return Err(invalid(
            "multipart",
            format!("boundary must be 1 to {MAX_BOUNDARY_LEN} characters"),
        ));
    }
    if boundary.ends_with(' ') {
        return Err(invalid("multipart", "boundary must not end with a space"));
    }
    let allowed = |ch: char| ch.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(ch);
    if !boundary.chars().all(allowed) {
        return Err(invalid(
            "multipart",
            format!("boundary '{boundary}' contains invalid characters"),
        ));
    }
    Ok(())
}
