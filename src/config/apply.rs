use std::path::PathBuf;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{CliArgs, parse_request_id};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Flags given on the command
/// line keep their values; config variables are overridden per key by `--var`.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut CliArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_cli(matches, "host")
        && let Some(host) = config.host.clone()
    {
        args.host = host;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = timeout
            .to_duration()
            .map_err(|source| ConfigError::InvalidField {
                field: "timeout",
                source,
            })?;
    }

    if !is_cli(matches, "retry")
        && let Some(retry) = config.retry
    {
        args.retry = retry;
    }

    if !is_cli(matches, "proxy")
        && let Some(proxy) = config.proxy.clone()
    {
        args.proxy = Some(proxy);
    }

    if !is_cli(matches, "output")
        && let Some(output) = config.output.as_ref()
    {
        args.output = Some(PathBuf::from(output));
    }

    if !is_cli(matches, "format")
        && let Some(format) = config.format
    {
        args.format = format;
    }

    if !is_cli(matches, "user_agent")
        && let Some(user_agent) = config.user_agent.clone()
    {
        args.user_agent = Some(user_agent);
    }

    if !is_cli(matches, "request_id")
        && let Some(spec) = config.request_id.as_deref()
    {
        let request_id =
            parse_request_id(spec).map_err(|source| ConfigError::InvalidField {
                field: "request_id",
                source,
            })?;
        args.request_id = Some(request_id);
    }

    if let Some(vars) = config.vars.as_ref() {
        let mut merged: Vec<_> = vars
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        merged.append(&mut args.vars);
        args.vars = merged;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "dry_run")
        && let Some(dry_run) = config.dry_run
    {
        args.dry_run = dry_run;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
