//! Reading request templates from JSON, JSON Lines and YAML documents.

mod jsonl;

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::InputError;
use crate::template::{RequestTemplate, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    JsonLines,
    Yaml,
}

impl InputFormat {
    /// Picks the format from a file extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for anything but `.json`, `.jsonl`,
    /// `.yaml` and `.yml`.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(InputFormat::Json),
            "jsonl" => Ok(InputFormat::JsonLines),
            "yaml" | "yml" => Ok(InputFormat::Yaml),
            _ => Err(InputError::UnsupportedFormat { extension }),
        }
    }

    /// Guesses the format of stdin input.
    ///
    /// A document that parses as JSON is JSON unless a later line also parses
    /// on its own. Input whose first content line is a JSON object is JSON
    /// Lines. YAML comes next, and JSON is the fallback so its parse error is
    /// the one reported.
    #[must_use]
    pub fn detect(data: &str) -> Self {
        let mut lines = jsonl::content_lines(data);
        let first_is_json = lines
            .next()
            .is_some_and(|line| serde_json::from_str::<serde_json::Value>(line).is_ok());

        if serde_json::from_str::<serde_json::Value>(data).is_ok() {
            let later_is_json = lines
                .next()
                .is_some_and(|line| serde_json::from_str::<serde_json::Value>(line).is_ok());
            return if first_is_json && later_is_json {
                InputFormat::JsonLines
            } else {
                InputFormat::Json
            };
        }
        if first_is_json {
            return InputFormat::JsonLines;
        }
        if serde_yaml::Deserializer::from_str(data)
            .all(|document| serde_yaml::Value::deserialize(document).is_ok())
        {
            return InputFormat::Yaml;
        }
        InputFormat::Json
    }
}

/// Parses `data` into templates tagged with `source`.
///
/// # Errors
///
/// Returns an `InputError` when the document is malformed or holds no
/// template.
pub fn parse_documents(
    data: &str,
    format: InputFormat,
    source: &Source,
) -> Result<Vec<RequestTemplate>, InputError> {
    let templates = match format {
        InputFormat::Json => {
            let template: RequestTemplate =
                serde_json::from_str(data).map_err(|source| InputError::ParseJson { source })?;
            vec![template]
        }
        InputFormat::JsonLines => vec![jsonl::parse(data)?],
        InputFormat::Yaml => parse_yaml(data)?,
    };
    debug!("Parsed {} template(s) from {}", templates.len(), source);
    Ok(templates
        .into_iter()
        .map(|template| template.with_source(source.clone()))
        .collect())
}

fn parse_yaml(data: &str) -> Result<Vec<RequestTemplate>, InputError> {
    let mut templates = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(data).enumerate() {
        let raw = serde_yaml::Value::deserialize(document)
            .map_err(|source| InputError::ParseYaml { index, source })?;
        if raw.is_null() {
            continue;
        }
        let template = serde_yaml::from_value(raw)
            .map_err(|source| InputError::ParseYaml { index, source })?;
        templates.push(template);
    }
    if templates.is_empty() {
        return Err(InputError::EmptyYaml);
    }
    Ok(templates)
}

/// Reads and parses one template file.
///
/// # Errors
///
/// Returns an `InputError` when the extension is unsupported, the file cannot
/// be read, or its contents do not parse.
pub async fn load_file(path: &Path) -> Result<Vec<RequestTemplate>, InputError> {
    let format = InputFormat::from_path(path)?;
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_documents(&data, format, &Source::File(path.to_path_buf()))
}

/// Reads all of stdin and parses it in the detected format.
///
/// # Errors
///
/// Returns an `InputError` when stdin cannot be read or does not parse.
pub async fn load_stdin() -> Result<Vec<RequestTemplate>, InputError> {
    let mut data = String::new();
    tokio::io::stdin()
        .read_to_string(&mut data)
        .await
        .map_err(|source| InputError::ReadStdin { source })?;
    let format = InputFormat::detect(&data);
    debug!("Detected {:?} input on stdin", format);
    parse_documents(&data, format, &Source::Stdin)
}
