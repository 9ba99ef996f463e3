use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::form_urlencoded;

use crate::error::EvalResult;
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::{arity, int_arg, invalid, mismatch, string_arg};

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "url_encode",
        signature: "$url_encode [string, times?, keep?]",
        description: "Form-style percent encoding, optionally repeated and skipping the characters in `keep`.",
        call: url_encode,
    },
    Builtin {
        name: "url_decode",
        signature: "$url_decode <string>",
        description: "Decodes form-style percent encoding ('+' becomes a space).",
        call: url_decode,
    },
    Builtin {
        name: "base64_encode",
        signature: "$base64_encode <string>",
        description: "Standard base64 with padding.",
        call: base64_encode,
    },
    Builtin {
        name: "base64_decode",
        signature: "$base64_decode <string>",
        description: "Decodes standard base64.",
        call: base64_decode,
    },
    Builtin {
        name: "hex_encode",
        signature: "$hex_encode <string>",
        description: "Lowercase hex of the UTF-8 bytes.",
        call: hex_encode,
    },
    Builtin {
        name: "html_encode",
        signature: "$html_encode <string>",
        description: "Escapes & < > \" and '.",
        call: html_encode,
    },
    Builtin {
        name: "html_decode",
        signature: "$html_decode <string>",
        description: "Unescapes named and numeric HTML character references.",
        call: html_decode,
    },
];

/// Form-style escaping of a whole string (space becomes `+`).
pub(super) fn query_escape(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

fn single_string<'arg>(function: &'static str, args: &'arg [Value]) -> EvalResult<&'arg str> {
    let [input] = args else {
        return Err(arity(function, "1", args));
    };
    string_arg(function, 1, input)
}

fn url_encode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    const NAME: &str = "url_encode";
    let (input, times, keep) = match args {
        [input] => (string_arg(NAME, 1, input)?, 1, ""),
        [input, second] => {
            let input = string_arg(NAME, 1, input)?;
            match second {
                Value::String(keep) => (input, 1, keep.as_str()),
                Value::Number(_) => (input, int_arg(NAME, 2, second)?, ""),
                Value::Null | Value::Bool(_) | Value::Sequence(_) | Value::Mapping(_) => {
                    return Err(mismatch(NAME, 2, "an integer or a string", second));
                }
            }
        }
        [input, times, keep] => (
            string_arg(NAME, 1, input)?,
            int_arg(NAME, 2, times)?,
            string_arg(NAME, 3, keep)?,
        ),
        _ => return Err(arity(NAME, "1 to 3", args)),
    };
    if times < 0 {
        return Err(invalid(NAME, "repeat count must not be negative"));
    }

    let mut encoded = input.to_owned();
    for _ in 0..times {
        encoded = if keep.is_empty() {
            query_escape(&encoded)
        } else {
            encoded
                .chars()
                .map(|ch| {
                    if keep.contains(ch) {
                        ch.to_string()
                    } else {
                        query_escape(ch.encode_utf8(&mut [0; 4]))
                    }
                })
                .collect()
        };
    }
    Ok(Value::String(encoded))
}

fn url_decode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = single_string("url_decode", args)?;
    check_escapes(input)?;
    let spaced = input.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .map_err(|err| invalid("url_decode", format!("decoded bytes are not UTF-8: {err}")))?;
    Ok(Value::String(decoded.into_owned()))
}

/// Every `%` must start a two-digit hex escape.
fn check_escapes(input: &str) -> EvalResult<()> {
    let mut rest = input;
    while let Some(position) = rest.find('%') {
        let after = rest.get(position.saturating_add(1)..).unwrap_or_default();
        let pair = after
            .get(..2)
            .ok_or_else(|| invalid("url_decode", format!("truncated escape in '{input}'")))?;
        if !pair.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(invalid("url_decode", format!("invalid escape in '{input}'")));
        }
        rest = after.get(2..).unwrap_or_default();
    }
    Ok(())
}

fn base64_encode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = single_string("base64_encode", args)?;
    Ok(Value::String(STANDARD.encode(input)))
}

fn base64_decode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = single_string("base64_decode", args)?;
    let decoded = STANDARD
        .decode(input)
        .map_err(|err| invalid("base64_decode", err.to_string()))?;
    let text = String::from_utf8(decoded)
        .map_err(|err| invalid("base64_decode", format!("decoded bytes are not UTF-8: {err}")))?;
    Ok(Value::String(text))
}

fn hex_encode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = single_string("hex_encode", args)?;
    Ok(Value::String(hex::encode(input)))
}

fn html_encode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = single_string("html_encode", args)?;
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Ok(Value::String(out))
}

fn html_decode(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let input = single_string("html_decode", args)?;
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        let (before, candidate) = rest.split_at(start);
        out.push_str(before);
        match candidate
            .find(';')
            .and_then(|end| Some((decode_entity(candidate.get(1..end)?)?, end)))
        {
            Some((ch, end)) => {
                out.push(ch);
                rest = candidate.get(end.saturating_add(1)..).unwrap_or_default();
            }
            None => {
                out.push('&');
                rest = candidate.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);
    Ok(Value::String(out))
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
