use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while resolving a template value tree.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Unknown function '{name}'.")]
    UnknownFunction { name: String },
    #[error("Function '{function}' expects {expected} argument(s), got {actual}.")]
    ArityMismatch {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },
    #[error("Function '{function}' expects {expected} for argument {position}, got {actual}.")]
    ArgumentTypeMismatch {
        function: &'static str,
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Function '{function}' rejected its arguments: {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },
    #[error("Variable '{name}' is not defined.")]
    UndefinedVariable { name: String },
    #[error(
        "Unable to resolve variables (circular dependency or undefined reference): {}",
        names.join(", ")
    )]
    CircularOrUndefinedReference { names: Vec<String> },
    #[error("Unsupported dictionary file format '{extension}' for '{path}'.")]
    UnsupportedFileFormat { path: PathBuf, extension: String },
    #[error("Path '{path}' is not allowed: {reason}")]
    PathSecurityViolation { path: String, reason: &'static str },
    #[error("Failed to read '{path}': {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse dictionary file '{path}': {message}")]
    DictionaryParse { path: PathBuf, message: String },
    #[error("Template nesting exceeds the maximum depth of {limit}.")]
    DepthExceeded { limit: usize },
}

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Function '{name}' is already registered.")]
    Duplicate { name: String },
}
