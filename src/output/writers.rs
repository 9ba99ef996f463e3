use std::fmt::Write as _;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::OutputError;

use super::record::ResultRecord;

const CSV_HEADER: &str = "Method,URL,StatusCode,ResponseTime,BodyLength,RequestID";
const TABLE_HEADER: &str = "METHOD\tURL\tSTATUS\tTIME\tSIZE\tREQUEST_ID";
const TABLE_RULE_WIDTH: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Table,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Table => "table",
        }
    }
}

/// Renders all records in `format`, newline terminated.
///
/// # Errors
///
/// Returns an `OutputError` when serialization fails.
pub fn render(records: &[ResultRecord], format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(records)
                .map_err(|source| OutputError::Serialize { source })?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => {
            render_csv(records).map_err(|source| OutputError::WriteLine { source })
        }
        OutputFormat::Table => {
            render_table(records).map_err(|source| OutputError::WriteLine { source })
        }
    }
}

fn render_csv(records: &[ResultRecord]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{CSV_HEADER}")?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{:.3},{},{}",
            csv_field(&record.request.method),
            csv_field(&record.request.url),
            record.response.status_code,
            record.response.time.total,
            record.response.body.len(),
            csv_field(&record.metadata.request_id)
        )?;
    }
    Ok(out)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn render_table(records: &[ResultRecord]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{TABLE_HEADER}")?;
    writeln!(out, "{}", "-".repeat(TABLE_RULE_WIDTH))?;
    for record in records {
        writeln!(
            out,
            "{}\t{}\t{}\t{:.3}s\t{}\t{}",
            record.request.method,
            record.request.url,
            record.response.status_code,
            record.response.time.total,
            record.response.body.len(),
            record.metadata.request_id
        )?;
    }
    Ok(out)
}

/// Writes rendered output to `path`, or to stdout when no path is given.
///
/// # Errors
///
/// Returns an `OutputError` when the file or stdout cannot be written.
pub async fn write_output(rendered: &str, path: Option<&Path>) -> Result<(), OutputError> {
    match path {
        Some(path) => {
            let to_error = |source| OutputError::WriteFile {
                path: path.to_path_buf(),
                source,
            };
            let file = tokio::fs::File::create(path).await.map_err(to_error)?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(rendered.as_bytes())
                .await
                .map_err(to_error)?;
            writer.flush().await.map_err(to_error)
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(rendered.as_bytes())
                .await
                .map_err(|source| OutputError::WriteStdout { source })?;
            stdout
                .flush()
                .await
                .map_err(|source| OutputError::WriteStdout { source })
        }
    }
}
