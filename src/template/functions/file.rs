use std::path::{Component, Path};

use crate::error::{EvalError, EvalResult};
use crate::template::context::EvalContext;
use crate::template::registry::Builtin;
use crate::template::value::Value;

use super::{arity, string_arg};

pub(super) const BUILTINS: &[Builtin] = &[Builtin {
    name: "file",
    signature: "$file <path>",
    description: "Contents of a file relative to the template's directory.",
    call: file,
}];

fn file(args: &[Value], ctx: &EvalContext<'_>) -> EvalResult<Value> {
    let [path] = args else {
        return Err(arity("file", "1", args));
    };
    let requested = string_arg("file", 1, path)?;
    confine(requested)?;

    let full = ctx.base_dir().join(requested);
    let contents = std::fs::read(&full).map_err(|source| EvalError::IoFailure {
        path: full.clone(),
        source,
    })?;
    let text = String::from_utf8(contents).map_err(|err| EvalError::IoFailure {
        path: full.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })?;
    tracing::debug!("Read {} bytes from {}", text.len(), full.display());
    Ok(Value::String(text))
}

/// Rejects absolute paths and any relative path that climbs above its base
/// directory once `.` and `..` are applied lexically.
pub(super) fn confine(requested: &str) -> EvalResult<()> {
    let violation = |reason| EvalError::PathSecurityViolation {
        path: requested.to_owned(),
        reason,
    };
    let path = Path::new(requested);
    if path.is_absolute() || path.has_root() {
        return Err(violation("absolute paths are not allowed"));
    }

    let mut depth: usize = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth = depth.saturating_add(1),
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| violation("path escapes the template directory"))?;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(violation("absolute paths are not allowed"));
            }
        }
    }
    Ok(())
}
