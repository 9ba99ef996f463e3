use crate::args::CliArgs;

pub(crate) enum RunPlan {
    ListFunctions,
    Batch(CliArgs),
}
