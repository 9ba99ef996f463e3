use clap::ArgMatches;

use crate::args::CliArgs;
use crate::error::AppResult;

use super::types::RunPlan;

pub(crate) fn build_plan(args: CliArgs, matches: &ArgMatches) -> AppResult<RunPlan> {
    let args = apply_config(args, matches)?;
    crate::logger::init_logging(args.verbose);

    if args.list_functions {
        return Ok(RunPlan::ListFunctions);
    }
    Ok(RunPlan::Batch(args))
}

fn apply_config(mut args: CliArgs, matches: &ArgMatches) -> AppResult<CliArgs> {
    let loaded_config = crate::config::load_config(args.config.as_deref())?;
    if let Some(config) = loaded_config {
        crate::config::apply_config(&mut args, matches, &config)?;
    }
    Ok(args)
}
