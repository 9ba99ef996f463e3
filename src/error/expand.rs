use thiserror::Error;

use super::EvalError;

/// Part of a request template an expansion failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Variables,
    Path,
    Query,
    Headers,
    Params,
    Body,
}

impl Section {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::Variables => "variables",
            Section::Path => "path",
            Section::Query => "query",
            Section::Headers => "headers",
            Section::Params => "params",
            Section::Body => "body",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("Failed to process {section}: {source}")]
    Eval {
        section: Section,
        #[source]
        source: EvalError,
    },
    #[error("Section '{section}' must evaluate to a mapping, got {actual}.")]
    NotAMapping {
        section: Section,
        actual: &'static str,
    },
    #[error("Request ID location '{location}' requires a key.")]
    RequestIdKeyMissing { location: &'static str },
    #[error("Failed to serialize body as JSON: {source}")]
    SerializeBody {
        #[source]
        source: serde_json::Error,
    },
}

impl ExpandError {
    /// The underlying evaluation error, when this failure came from one.
    #[must_use]
    pub const fn eval_source(&self) -> Option<&EvalError> {
        match self {
            ExpandError::Eval { source, .. } => Some(source),
            ExpandError::NotAMapping { .. }
            | ExpandError::RequestIdKeyMissing { .. }
            | ExpandError::SerializeBody { .. } => None,
        }
    }
}
