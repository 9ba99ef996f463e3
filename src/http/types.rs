use std::collections::BTreeMap;

use serde::Serialize;

/// Phase durations in seconds. `dns`, `connect` and `ssl` are not measured
/// and stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResponseTiming {
    pub total: f64,
    pub dns: f64,
    pub connect: f64,
    pub ssl: f64,
    pub send: f64,
    pub wait: f64,
    pub receive: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub time: ResponseTiming,
}
