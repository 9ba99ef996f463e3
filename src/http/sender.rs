use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Proxy};
use tracing::{debug, error, warn};

use crate::error::HttpError;
use crate::template::ResolvedRequest;

use super::types::{ResponseData, ResponseTiming};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Something that turns a resolved request into a response.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` when the request cannot be built or sent, or
    /// when retries are exhausted.
    async fn dispatch(&self, request: &ResolvedRequest) -> Result<ResponseData, HttpError>;
}

#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub retry: u32,
    pub user_agent: String,
}

/// reqwest-backed dispatcher with retry on transport errors and 5xx.
#[derive(Debug, Clone)]
pub struct Sender {
    client: Client,
    retry: u32,
    user_agent: String,
}

impl Sender {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProxy` for an unusable proxy URL and
    /// `BuildClientFailed` when reqwest rejects the configuration.
    pub fn new(config: &SenderConfig) -> Result<Self, HttpError> {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = Proxy::all(proxy_url).map_err(|source| {
                error!("Invalid proxy URL '{}': {}", proxy_url, source);
                HttpError::InvalidProxy {
                    url: proxy_url.to_owned(),
                    source,
                }
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|source| HttpError::BuildClientFailed { source })?;
        Ok(Self {
            client,
            retry: config.retry,
            user_agent: config.user_agent.clone(),
        })
    }

    async fn send_once(
        &self,
        method: &Method,
        headers: &HeaderMap,
        request: &ResolvedRequest,
    ) -> Result<ResponseData, HttpError> {
        let started = Instant::now();
        let mut builder = self
            .client
            .request(method.clone(), &request.url)
            .headers(headers.clone());
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }
        let sent = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|source| HttpError::SendFailed {
                url: request.url.clone(),
                source,
            })?;
        let headers_at = Instant::now();

        let status_code = response.status().as_u16();
        let mut response_headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers() {
            response_headers
                .entry(name.as_str().to_owned())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let body = response
            .text()
            .await
            .map_err(|source| HttpError::ReadBodyFailed {
                url: request.url.clone(),
                source,
            })?;
        let done = Instant::now();

        Ok(ResponseData {
            status_code,
            headers: response_headers,
            body,
            time: ResponseTiming {
                total: done.duration_since(started).as_secs_f64(),
                send: sent.duration_since(started).as_secs_f64(),
                wait: headers_at.duration_since(sent).as_secs_f64(),
                receive: done.duration_since(headers_at).as_secs_f64(),
                ..ResponseTiming::default()
            },
        })
    }
}

#[async_trait]
impl Dispatch for Sender {
    async fn dispatch(&self, request: &ResolvedRequest) -> Result<ResponseData, HttpError> {
        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|_err| HttpError::InvalidMethod {
                method: request.method.clone(),
            })?;
        let headers = header_map(&prepare_headers(
            &request.headers,
            &request.body,
            &self.user_agent,
        ))?;

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_secs(u64::from(attempt))).await;
            }
            let failure = match self.send_once(&method, &headers, request).await {
                Ok(response) if response.status_code < 500 => {
                    debug!(
                        "{} {} -> {}",
                        request.method, request.url, response.status_code
                    );
                    return Ok(response);
                }
                Ok(response) => HttpError::ServerError {
                    status: response.status_code,
                },
                Err(err) => err,
            };
            if attempt >= self.retry {
                return Err(HttpError::RetriesExhausted {
                    retries: self.retry,
                    last: Box::new(failure),
                });
            }
            attempt = attempt.saturating_add(1);
            warn!(
                "Attempt {} of {} for {} failed: {}",
                attempt,
                self.retry.saturating_add(1),
                request.url,
                failure
            );
        }
    }
}

/// Skips the network and answers every request with an empty response.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

#[async_trait]
impl Dispatch for DryRun {
    async fn dispatch(&self, request: &ResolvedRequest) -> Result<ResponseData, HttpError> {
        debug!("Dry run: {} {}", request.method, request.url);
        Ok(ResponseData::default())
    }
}

/// Template headers plus the defaults applied at send time: a form
/// content type for non-empty bodies and the configured user agent.
/// Existing headers win, compared case-insensitively.
#[must_use]
pub fn prepare_headers(
    headers: &BTreeMap<String, String>,
    body: &str,
    user_agent: &str,
) -> Vec<(String, String)> {
    let has = |name: &str| headers.keys().any(|key| key.eq_ignore_ascii_case(name));
    let mut prepared: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    if !body.is_empty() && !has("content-type") {
        prepared.push(("Content-Type".to_owned(), FORM_CONTENT_TYPE.to_owned()));
    }
    if !has("user-agent") && !user_agent.is_empty() {
        prepared.push(("User-Agent".to_owned(), user_agent.to_owned()));
    }
    prepared
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_err| {
            HttpError::InvalidHeader { name: name.clone() }
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_err| HttpError::InvalidHeader {
            name: name.clone(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
