mod plan;

use std::ffi::OsString;
use std::io::IsTerminal;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{CliArgs, DEFAULT_CONFIG_FILES};
use crate::error::AppResult;
use plan::{build_plan, execute_plan};

pub(crate) fn run() -> AppResult<()> {
    let (args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    let plan = build_plan(args, &matches)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute_plan(plan))
}

fn parse_args() -> AppResult<Option<(CliArgs, ArgMatches)>> {
    let mut cmd = CliArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = CliArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

/// A bare invocation at an interactive terminal has nothing to read.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty || !std::io::stdin().is_terminal() {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| std::path::Path::new(path).exists())
}
