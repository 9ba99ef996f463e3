use std::fmt::Write as _;

use tracing::info;

use crate::app::BatchRunner;
use crate::args::CliArgs;
use crate::error::{AppError, AppResult};
use crate::output::{render, write_output};
use crate::template::Registry;

use super::types::RunPlan;

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::ListFunctions => {
            let listing = function_listing(&Registry::with_builtins()).map_err(|source| {
                AppError::output(crate::error::OutputError::WriteLine { source })
            })?;
            write_output(&listing, None).await?;
            Ok(())
        }
        RunPlan::Batch(args) => run_batch(&args).await,
    }
}

async fn run_batch(args: &CliArgs) -> AppResult<()> {
    let runner = BatchRunner::from_args(args)?;
    let records = if args.reads_stdin() {
        runner.run_stdin().await
    } else {
        runner.run_files(&args.files).await
    };
    info!("Collected {} result(s)", records.len());

    let rendered = render(&records, args.format)?;
    write_output(&rendered, args.output.as_deref()).await?;
    Ok(())
}

pub(super) fn function_listing(registry: &Registry) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    for function in registry.functions() {
        writeln!(out, "{:<40} {}", function.signature(), function.description())?;
    }
    Ok(out)
}
