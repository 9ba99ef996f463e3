use chrono::{Local, SecondsFormat};
use serde::Serialize;

use crate::http::ResponseData;
use crate::template::{ResolvedRequest, Source};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub file: String,
    /// RFC 3339, local time.
    pub timestamp: String,
    /// Empty when no request ID was configured.
    pub request_id: String,
}

/// One sent request with its response, as written to the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub request: ResolvedRequest,
    pub response: ResponseData,
    pub metadata: Metadata,
}

impl ResultRecord {
    #[must_use]
    pub fn new(request: ResolvedRequest, response: ResponseData, source: &Source) -> Self {
        let metadata = Metadata {
            file: source.to_string(),
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            request_id: request.request_id.clone().unwrap_or_default(),
        };
        Self {
            request,
            response,
            metadata,
        }
    }
}
