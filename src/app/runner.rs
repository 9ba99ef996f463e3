use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::args::{CliArgs, DEFAULT_USER_AGENT};
use crate::error::AppResult;
use crate::http::{Dispatch, DryRun, Sender, SenderConfig};
use crate::input;
use crate::output::ResultRecord;
use crate::template::{
    Bindings, Evaluator, Expander, Registry, RequestIdConfig, RequestTemplate,
};

/// Loads templates, expands them and sends every resulting request.
///
/// A file, document or request that fails is logged and skipped; the rest of
/// the batch still runs.
pub(crate) struct BatchRunner {
    expander: Expander,
    dispatcher: Arc<dyn Dispatch>,
    base_url: String,
    default_request_id: Option<RequestIdConfig>,
}

impl BatchRunner {
    pub(crate) fn new(
        expander: Expander,
        dispatcher: Arc<dyn Dispatch>,
        base_url: String,
        default_request_id: Option<RequestIdConfig>,
    ) -> Self {
        Self {
            expander,
            dispatcher,
            base_url,
            default_request_id,
        }
    }

    /// Wires the built-in registry, `--var` seed and sender from CLI flags.
    pub(crate) fn from_args(args: &CliArgs) -> AppResult<Self> {
        let dispatcher: Arc<dyn Dispatch> = if args.dry_run {
            Arc::new(DryRun)
        } else {
            let config = SenderConfig {
                timeout: args.timeout,
                proxy: args.proxy.clone(),
                retry: args.retry,
                user_agent: args
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            };
            Arc::new(Sender::new(&config)?)
        };
        let seed: Bindings = args.vars.iter().cloned().collect();
        let registry = Arc::new(Registry::with_builtins());
        let expander = Expander::new(Evaluator::new(registry)).with_seed(seed)?;
        Ok(Self::new(
            expander,
            dispatcher,
            args.host.clone(),
            args.request_id.clone(),
        ))
    }

    pub(crate) async fn run_files(&self, files: &[PathBuf]) -> Vec<ResultRecord> {
        let mut records = Vec::new();
        for path in files {
            debug!("Processing {}", path.display());
            match input::load_file(path).await {
                Ok(templates) => records.extend(self.run_templates(templates).await),
                Err(err) => error!("Skipping {}: {}", path.display(), err),
            }
        }
        records
    }

    pub(crate) async fn run_stdin(&self) -> Vec<ResultRecord> {
        match input::load_stdin().await {
            Ok(templates) => self.run_templates(templates).await,
            Err(err) => {
                error!("Skipping stdin: {}", err);
                Vec::new()
            }
        }
    }

    pub(crate) async fn run_templates(&self, templates: Vec<RequestTemplate>) -> Vec<ResultRecord> {
        let mut records = Vec::new();
        for (index, template) in templates.iter().enumerate() {
            let requests = match self.expander.expand(
                template,
                &self.base_url,
                self.default_request_id.as_ref(),
            ) {
                Ok(requests) => requests,
                Err(err) => {
                    error!(
                        "Skipping document {} of {}: {}",
                        index.saturating_add(1),
                        template.source,
                        err
                    );
                    continue;
                }
            };
            debug!(
                "Document {} of {} expanded to {} request(s)",
                index.saturating_add(1),
                template.source,
                requests.len()
            );
            for request in requests {
                match self.dispatcher.dispatch(&request).await {
                    Ok(response) => {
                        info!(
                            "{} {} -> {} ({:.3}s)",
                            request.method, request.url, response.status_code, response.time.total
                        );
                        records.push(ResultRecord::new(request, response, &template.source));
                    }
                    Err(err) => error!("{} {} failed: {}", request.method, request.url, err),
                }
            }
        }
        records
    }
}
