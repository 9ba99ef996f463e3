use clap::{CommandFactory, FromArgMatches};

use super::build::build_plan;
use super::execute::function_listing;
use super::types::RunPlan;
use crate::args::CliArgs;
use crate::template::Registry;

#[test]
fn listing_covers_every_builtin() -> Result<(), String> {
    let registry = Registry::with_builtins();
    let listing = function_listing(&registry).map_err(|err| err.to_string())?;
    if listing.lines().count() != registry.len() {
        return Err(format!("Unexpected listing:\n{}", listing));
    }
    for name in registry.names() {
        if !listing.contains(name) {
            return Err(format!("Missing {} in listing", name));
        }
    }
    Ok(())
}

#[test]
fn list_functions_flag_selects_listing() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let config = dir.path().join("none.json");
    std::fs::write(&config, "{}").map_err(|err| err.to_string())?;
    let config_arg = config.display().to_string();
    let matches = CliArgs::command()
        .try_get_matches_from(["s2req", "--config", config_arg.as_str(), "--list-functions"])
        .map_err(|err| err.to_string())?;
    let args = CliArgs::from_arg_matches(&matches).map_err(|err| err.to_string())?;
    match build_plan(args, &matches).map_err(|err| err.to_string())? {
        RunPlan::ListFunctions => Ok(()),
        RunPlan::Batch(_) => Err("Expected the listing plan".to_owned()),
    }
}
