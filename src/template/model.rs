use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::value::{Mapping, Value};

/// Where a template was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    #[default]
    Stdin,
}

impl Source {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::File(path) => Some(path),
            Source::Stdin => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Stdin => f.write_str("stdin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestIdLocation {
    PathHead,
    PathTail,
    Query,
    Header,
}

impl RequestIdLocation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestIdLocation::PathHead => "path_head",
            RequestIdLocation::PathTail => "path_tail",
            RequestIdLocation::Query => "query",
            RequestIdLocation::Header => "header",
        }
    }
}

/// Placement of a generated request identifier. `key` names the query
/// parameter or header and is required for those locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestIdConfig {
    pub location: RequestIdLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetaConfig {
    #[serde(default, rename = "request-id")]
    pub request_id: Option<RequestIdConfig>,
}

/// One declarative request description, unresolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestTemplate {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_path")]
    pub path: Value,
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub headers: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub variables: Mapping,
    /// Columns zipped by index; a column may also be a call that yields a list.
    #[serde(default)]
    pub dictionary: BTreeMap<String, Value>,
    #[serde(default)]
    pub meta: Option<MetaConfig>,
    #[serde(skip)]
    pub source: Source,
}

fn default_method() -> String {
    "GET".to_owned()
}

fn default_path() -> Value {
    Value::String(String::new())
}

impl RequestTemplate {
    #[must_use]
    pub fn request_id(&self) -> Option<&RequestIdConfig> {
        self.meta.as_ref().and_then(|meta| meta.request_id.as_ref())
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }
}

/// A fully expanded request, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
