use std::collections::BTreeMap;

use super::functions::encode_form;
use super::model::ResolvedRequest;
use super::value::Mapping;

/// Evaluated pieces of one request before URL and header assembly.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: String,
    pub base_url: String,
    pub path: String,
    pub query: Mapping,
    pub headers: Mapping,
    pub body: String,
    pub request_id: Option<String>,
}

/// Joins base URL, path and query string and flattens headers to text.
///
/// Null query entries and null headers are dropped. No default headers are
/// added here; that is the sender's job.
#[must_use]
pub fn materialize(parts: RequestParts) -> ResolvedRequest {
    let RequestParts {
        method,
        base_url,
        path,
        query,
        headers,
        body,
        request_id,
    } = parts;

    let mut url = base_url;
    url.push_str(&path);
    let query_string = encode_form(&query);
    if !query_string.is_empty() {
        url.push('?');
        url.push_str(&query_string);
    }

    let headers: BTreeMap<String, String> = headers
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| (name, value.to_text()))
        .collect();

    ResolvedRequest {
        method,
        url,
        headers,
        body,
        request_id,
    }
}
