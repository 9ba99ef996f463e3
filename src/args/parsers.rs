use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};
use crate::template::{RequestIdConfig, RequestIdLocation, Value};

/// Parses `path=head|tail`, `query=<key>` or `header=<key>`.
///
/// # Errors
///
/// Returns a `ValidationError` for a missing `=`, an unknown type, an
/// unknown path position, or an empty key.
pub fn parse_request_id(s: &str) -> Result<RequestIdConfig, ValidationError> {
    let Some((kind, value)) = s.split_once('=') else {
        return Err(ValidationError::InvalidRequestIdFormat {
            value: s.to_owned(),
        });
    };
    let value = value.trim();
    match kind.trim() {
        "path" => {
            let location = match value {
                "head" => RequestIdLocation::PathHead,
                "tail" => RequestIdLocation::PathTail,
                _ => {
                    return Err(ValidationError::InvalidRequestIdPath {
                        value: value.to_owned(),
                    });
                }
            };
            Ok(RequestIdConfig {
                location,
                key: None,
            })
        }
        "query" => keyed(RequestIdLocation::Query, "query", value),
        "header" => keyed(RequestIdLocation::Header, "header", value),
        other => Err(ValidationError::InvalidRequestIdType {
            value: other.to_owned(),
        }),
    }
}

fn keyed(
    location: RequestIdLocation,
    kind: &'static str,
    key: &str,
) -> Result<RequestIdConfig, ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::RequestIdKeyEmpty { kind });
    }
    Ok(RequestIdConfig {
        location,
        key: Some(key.to_owned()),
    })
}

/// Parses `key=value`. The value is JSON when it parses as JSON and a plain
/// string otherwise; it may itself contain `=`.
///
/// # Errors
///
/// Returns a `ValidationError` when `=` is missing or the key is blank.
pub fn parse_var(s: &str) -> Result<(String, Value), ValidationError> {
    let Some((key, raw)) = s.split_once('=') else {
        return Err(ValidationError::InvalidVarFormat {
            value: s.to_owned(),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(ValidationError::VarKeyEmpty {
            value: s.to_owned(),
        });
    }
    let value =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_err| Value::String(raw.to_owned()));
    Ok((key.to_owned(), value))
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration(s).map_err(AppError::validation)
}

pub(crate) fn parse_duration(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut digits_len = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits_len = digits_len.saturating_add(1);
        } else {
            break;
        }
    }
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 =
        num_part
            .parse()
            .map_err(|err| ValidationError::InvalidDurationNumber {
                value: value.to_owned(),
                source: err,
            })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
