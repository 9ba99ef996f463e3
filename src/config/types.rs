use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::parse_duration;
use crate::error::ValidationError;
use crate::output::OutputFormat;
use crate::template::Value;

/// Defaults for CLI flags, read from `s2req.toml` / `s2req.json`.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub timeout: Option<DurationValue>,
    pub retry: Option<u32>,
    #[serde(alias = "proxy_url")]
    pub proxy: Option<String>,
    pub output: Option<String>,
    #[serde(alias = "output_format")]
    pub format: Option<OutputFormat>,
    #[serde(alias = "user-agent")]
    pub user_agent: Option<String>,
    /// Same syntax as `--request-id`.
    #[serde(alias = "request-id")]
    pub request_id: Option<String>,
    pub vars: Option<BTreeMap<String, Value>>,
    pub verbose: Option<bool>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
