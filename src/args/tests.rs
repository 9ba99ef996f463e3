use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::*;
use crate::error::{AppError, AppResult, ValidationError};
use crate::output::OutputFormat;
use crate::template::{RequestIdConfig, RequestIdLocation, Value};

fn parse(args: &[&str]) -> AppResult<CliArgs> {
    CliArgs::try_parse_from(args).map_err(AppError::from)
}

#[test]
fn defaults_without_flags() -> AppResult<()> {
    let args = parse(&["s2req"])?;
    if args.host != "http://localhost" {
        return Err(AppError::validation(format!("Unexpected host: {}", args.host)));
    }
    if args.timeout != Duration::from_secs(30) || args.retry != 0 {
        return Err(AppError::validation("Unexpected timeout or retry defaults"));
    }
    if args.format != OutputFormat::Json || args.output.is_some() {
        return Err(AppError::validation("Unexpected output defaults"));
    }
    if !args.reads_stdin() {
        return Err(AppError::validation("No files should mean stdin"));
    }
    Ok(())
}

#[test]
fn full_flag_set() -> AppResult<()> {
    let args = parse(&[
        "s2req",
        "--host",
        "https://target.test",
        "--timeout",
        "1500ms",
        "--retry",
        "2",
        "--proxy",
        "http://127.0.0.1:8080",
        "-v",
        "-o",
        "out.csv",
        "--format",
        "csv",
        "--user-agent",
        "probe/1",
        "--request-id",
        "header=X-Req",
        "--var",
        "user=admin",
        "--var",
        "ids=[1,2]",
        "--dry-run",
        "a.yaml",
        "b.json",
    ])?;
    if args.timeout != Duration::from_millis(1500) || args.retry != 2 {
        return Err(AppError::validation("Unexpected timeout or retry"));
    }
    if args.output != Some(PathBuf::from("out.csv")) || args.format != OutputFormat::Csv {
        return Err(AppError::validation("Unexpected output settings"));
    }
    let expected_id = RequestIdConfig {
        location: RequestIdLocation::Header,
        key: Some("X-Req".to_owned()),
    };
    if args.request_id != Some(expected_id) {
        return Err(AppError::validation(format!(
            "Unexpected request id: {:?}",
            args.request_id
        )));
    }
    let expected_vars = vec![
        ("user".to_owned(), Value::from("admin")),
        (
            "ids".to_owned(),
            Value::Sequence(vec![Value::from(1_i64), Value::from(2_i64)]),
        ),
    ];
    if args.vars != expected_vars {
        return Err(AppError::validation(format!("Unexpected vars: {:?}", args.vars)));
    }
    if !args.verbose || !args.dry_run || args.reads_stdin() || args.files.len() != 2 {
        return Err(AppError::validation("Unexpected switches or files"));
    }
    Ok(())
}

#[test]
fn dash_means_stdin() -> AppResult<()> {
    let args = parse(&["s2req", "-"])?;
    if !args.reads_stdin() {
        return Err(AppError::validation("Expected '-' to read stdin"));
    }
    Ok(())
}

#[test]
fn request_id_specs() -> Result<(), String> {
    let cases = [
        ("path=head", RequestIdLocation::PathHead, None),
        ("path=tail", RequestIdLocation::PathTail, None),
        ("query=rid", RequestIdLocation::Query, Some("rid")),
        ("header= X-Id ", RequestIdLocation::Header, Some("X-Id")),
    ];
    for (spec, location, key) in cases {
        let parsed = parse_request_id(spec).map_err(|err| err.to_string())?;
        if parsed.location != location || parsed.key.as_deref() != key {
            return Err(format!("{}: got {:?}", spec, parsed));
        }
    }
    Ok(())
}

#[test]
fn request_id_rejects_bad_specs() -> Result<(), String> {
    if !matches!(
        parse_request_id("header"),
        Err(ValidationError::InvalidRequestIdFormat { .. })
    ) {
        return Err("Expected missing '=' to fail".to_owned());
    }
    if !matches!(
        parse_request_id("path=middle"),
        Err(ValidationError::InvalidRequestIdPath { .. })
    ) {
        return Err("Expected unknown path position to fail".to_owned());
    }
    if !matches!(
        parse_request_id("query="),
        Err(ValidationError::RequestIdKeyEmpty { kind: "query" })
    ) {
        return Err("Expected empty query key to fail".to_owned());
    }
    if !matches!(
        parse_request_id("cookie=x"),
        Err(ValidationError::InvalidRequestIdType { .. })
    ) {
        return Err("Expected unknown type to fail".to_owned());
    }
    Ok(())
}

#[test]
fn var_values_parse_as_json_when_possible() -> Result<(), String> {
    let cases = [
        ("n=42", "n", Value::from(42_i64)),
        ("flag=true", "flag", Value::from(true)),
        ("name=admin", "name", Value::from("admin")),
        (" q =a=b", "q", Value::from("a=b")),
        ("quoted=\"x\"", "quoted", Value::from("x")),
        ("empty=", "empty", Value::from("")),
    ];
    for (raw, key, value) in cases {
        let parsed = parse_var(raw).map_err(|err| err.to_string())?;
        if parsed != (key.to_owned(), value.clone()) {
            return Err(format!("{}: got {:?}", raw, parsed));
        }
    }
    if !matches!(parse_var("novalue"), Err(ValidationError::InvalidVarFormat { .. })) {
        return Err("Expected missing '=' to fail".to_owned());
    }
    if !matches!(parse_var(" =x"), Err(ValidationError::VarKeyEmpty { .. })) {
        return Err("Expected blank key to fail".to_owned());
    }
    Ok(())
}

#[test]
fn duration_units() -> Result<(), String> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("5", Duration::from_secs(5)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (raw, expected) in cases {
        let parsed = parsers::parse_duration(raw).map_err(|err| err.to_string())?;
        if parsed != expected {
            return Err(format!("{}: got {:?}", raw, parsed));
        }
    }
    for bad in ["", "ms", "0s", "5d"] {
        if parsers::parse_duration(bad).is_ok() {
            return Err(format!("Expected '{}' to fail", bad));
        }
    }
    Ok(())
}

#[test]
fn invalid_flag_values_fail_parsing() -> Result<(), String> {
    for args in [
        vec!["s2req", "--format", "xml"],
        vec!["s2req", "--timeout", "abc"],
        vec!["s2req", "--request-id", "query="],
        vec!["s2req", "--var", "oops"],
    ] {
        if CliArgs::try_parse_from(&args).is_ok() {
            return Err(format!("Expected failure for {:?}", args));
        }
    }
    Ok(())
}

#[test]
fn default_user_agent_names_the_tool() -> Result<(), String> {
    if !DEFAULT_USER_AGENT.starts_with("s2req/") {
        return Err(format!("Unexpected user agent: {}", DEFAULT_USER_AGENT));
    }
    Ok(())
}
