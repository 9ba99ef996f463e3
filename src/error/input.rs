use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported file format '{extension}'. Use .json, .jsonl, .yaml or .yml.")]
    UnsupportedFormat { extension: String },
    #[error("Failed to parse JSON: {source}")]
    ParseJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse YAML document {index}: {source}")]
    ParseYaml {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("No valid JSON object found in JSONL input.")]
    EmptyJsonLines,
    #[error("No valid YAML documents found.")]
    EmptyYaml,
}
