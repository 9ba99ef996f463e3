use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::output::OutputFormat;
use crate::template::{RequestIdConfig, Value};

use super::defaults::{DEFAULT_HOST, DEFAULT_TIMEOUT};
use super::parsers::{parse_duration_arg, parse_request_id, parse_var};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "s2req",
    version,
    about = "Send HTTP requests described in JSON, JSONL or YAML templates - built-in functions, variables and dictionary fan-out for security testing."
)]
pub struct CliArgs {
    /// Base URL prepended to every request path
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long, default_value = DEFAULT_TIMEOUT, value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Extra attempts on transport errors and 5xx responses
    #[arg(long, default_value_t = 0)]
    pub retry: u32,

    /// Proxy URL for all requests
    #[arg(long)]
    pub proxy: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by S2REQ_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Write results to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Result format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// User-Agent sent when a template does not set one
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Attach a generated request ID: path=head|tail, query=<key> or header=<key>
    #[arg(long = "request-id", value_parser = parse_request_id)]
    pub request_id: Option<RequestIdConfig>,

    /// Template variable in 'key=value' format; JSON values are parsed (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,

    /// Path to config file (TOML/JSON). Defaults to ./s2req.toml or ./s2req.json if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Expand templates without sending anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// List the built-in template functions and exit
    #[arg(long = "list-functions")]
    pub list_functions: bool,

    /// Template files (.json, .jsonl, .yaml, .yml); none or '-' reads stdin
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl CliArgs {
    /// True when the templates come from stdin rather than files.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        match self.files.as_slice() {
            [] => true,
            [only] => only.as_os_str() == "-",
            _ => false,
        }
    }
}
