use std::path::Path;

use rand::seq::SliceRandom;

use crate::error::{EvalError, EvalResult};
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::{arity, int_arg, invalid, list_arg, string_arg};

const DEFAULT_PLACEHOLDER: &str = "{{FUZZ}}";

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "dict_load",
        signature: "$dict_load <path>",
        description: "Loads a word list from a .json, .yaml, .yml, .txt or extensionless file.",
        call: dict_load,
    },
    Builtin {
        name: "dict_random",
        signature: "$dict_random [list]",
        description: "Picks one random entry of a list.",
        call: dict_random,
    },
    Builtin {
        name: "dict_get",
        signature: "$dict_get [list, index]",
        description: "Entry at a zero-based index.",
        call: dict_get,
    },
    Builtin {
        name: "dict_fuzz",
        signature: "$dict_fuzz [list, template, placeholder?]",
        description: "Expands the template once per entry, replacing the placeholder (default {{FUZZ}}).",
        call: dict_fuzz,
    },
];

fn dict_load(args: &[Value], ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [path] = args else {
        return Err(arity("dict_load", "1", args));
    };
    let requested = Path::new(string_arg("dict_load", 1, path)?);
    let path = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        ctx.base_dir().join(requested)
    };

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let entries = match extension.as_str() {
        "json" => {
            let raw = read(&path)?;
            let data: Value = serde_json::from_str(&raw).map_err(|err| parse_error(&path, &err))?;
            flatten(data)
        }
        "yaml" | "yml" => {
            let raw = read(&path)?;
            let data: Value = serde_yaml::from_str(&raw).map_err(|err| parse_error(&path, &err))?;
            flatten(data)
        }
        "txt" | "" => read(&path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => return Err(EvalError::UnsupportedFileFormat { path, extension }),
    };
    tracing::debug!("Loaded {} dictionary entries from {}", entries.len(), path.display());
    Ok(Value::from(entries))
}

fn read(path: &Path) -> EvalResult<String> {
    std::fs::read_to_string(path).map_err(|source| EvalError::IoFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_error(path: &Path, err: &dyn std::fmt::Display) -> EvalError {
    EvalError::DictionaryParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Sequences keep one entry per item; mappings contribute their values,
/// recursively; a lone scalar becomes a one-entry list.
fn flatten(data: Value) -> Vec<String> {
    match data {
        Value::Sequence(items) => items.iter().map(Value::to_text).collect(),
        Value::Mapping(entries) => entries.into_values().flat_map(flatten).collect(),
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
            vec![scalar.to_text()]
        }
    }
}

fn dict_random(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [list] = args else {
        return Err(arity("dict_random", "1", args));
    };
    let list = list_arg("dict_random", 1, list)?;
    let picked = list
        .choose(&mut rand::thread_rng())
        .map(Value::to_text)
        .unwrap_or_default();
    Ok(Value::String(picked))
}

fn dict_get(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [list, index] = args else {
        return Err(arity("dict_get", "2", args));
    };
    let list = list_arg("dict_get", 1, list)?;
    let index = int_arg("dict_get", 2, index)?;
    usize::try_from(index)
        .ok()
        .and_then(|index| list.get(index))
        .map(|entry| Value::String(entry.to_text()))
        .ok_or_else(|| {
            invalid(
                "dict_get",
                format!("index {index} out of range [0, {})", list.len()),
            )
        })
}

fn dict_fuzz(args: &[Value], _ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let (list, template, placeholder) = match args {
        [list, template] => (list, template, DEFAULT_PLACEHOLDER),
        [list, template, placeholder] => {
            (list, template, string_arg("dict_fuzz", 3, placeholder)?)
        }
        _ => return Err(arity("dict_fuzz", "2 or 3", args)),
    };
    let list = list_arg("dict_fuzz", 1, list)?;
    let template = string_arg("dict_fuzz", 2, template)?;
    if placeholder.is_empty() {
        return Err(invalid("dict_fuzz", "placeholder must not be empty"));
    }
    let expanded: Vec<String> = list
        .iter()
        .map(|entry| template.replace(placeholder, &entry.to_text()))
        .collect();
    Ok(Value::from(expanded))
}
