use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::value::Value;

/// Resolved name to value table visible to `var` lookups.
pub type Bindings = BTreeMap<String, Value>;

/// Everything a function may consult besides its arguments.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'env> {
    pub bindings: &'env Bindings,
    source: Option<&'env Path>,
}

impl<'env> EvalContext<'env> {
    #[must_use]
    pub const fn new(bindings: &'env Bindings, source: Option<&'env Path>) -> Self {
        Self { bindings, source }
    }

    #[must_use]
    pub const fn with_bindings(self, bindings: &'env Bindings) -> Self {
        Self {
            bindings,
            source: self.source,
        }
    }

    /// Template file this evaluation originates from; `None` in stdin mode.
    #[must_use]
    pub const fn source(&self) -> Option<&'env Path> {
        self.source
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'env Value> {
        self.bindings.get(name)
    }

    /// Directory relative file arguments resolve against: the template's
    /// parent directory, or the process working directory when unknown.
    #[must_use]
    pub fn base_dir(&self) -> Cow<'env, Path> {
        match self.source.and_then(Path::parent) {
            Some(parent) if !parent.as_os_str().is_empty() => Cow::Borrowed(parent),
            Some(_) | None => Cow::Owned(
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            ),
        }
    }
}
