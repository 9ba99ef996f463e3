use std::collections::BTreeMap;

use tracing::warn;

use crate::error::InputError;
use crate::template::{Mapping, RequestTemplate, Value};

/// Trimmed lines that are neither blank nor `#` / `//` comments.
pub(super) fn content_lines(data: &str) -> impl Iterator<Item = &str> {
    data.lines().map(str::trim).filter(|line| is_content(line))
}

fn is_content(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#') && !line.starts_with("//")
}

/// Folds JSON Lines into one template.
///
/// The first line that forms a complete template is the base. Every valid
/// object line, the base included, adds each of its fields to a dictionary
/// column at the line's position among valid lines; gaps are null, so every
/// column has one entry per line.
pub(super) fn parse(data: &str) -> Result<RequestTemplate, InputError> {
    let mut base: Option<RequestTemplate> = None;
    let mut rows: Vec<Mapping> = Vec::new();

    for (number, line) in data.lines().map(str::trim).enumerate() {
        if !is_content(line) {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Mapping(fields)) => {
                if base.is_none() {
                    base = serde_json::from_str::<RequestTemplate>(line).ok();
                }
                rows.push(fields);
            }
            Ok(other) => warn!(
                "Skipping JSONL line {}: expected an object, got {}",
                number.saturating_add(1),
                other.type_name()
            ),
            Err(err) => warn!("Skipping invalid JSONL line {}: {}", number.saturating_add(1), err),
        }
    }

    let mut template = base.ok_or(InputError::EmptyJsonLines)?;
    let mut columns: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for (index, fields) in rows.iter().enumerate() {
        for (key, value) in fields {
            let column = columns.entry(key.clone()).or_default();
            column.resize(index, Value::Null);
            column.push(value.clone());
        }
    }
    for (key, mut column) in columns {
        column.resize(rows.len(), Value::Null);
        template.dictionary.insert(key, Value::Sequence(column));
    }
    Ok(template)
}
