use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{EvalError, EvalResult, ExpandError, Section};

use super::context::{Bindings, EvalContext};
use super::eval::Evaluator;
use super::functions::encode_form;
use super::materialize::{RequestParts, materialize};
use super::model::{RequestIdConfig, RequestIdLocation, RequestTemplate, ResolvedRequest};
use super::resolver::VariableResolver;
use super::value::{Mapping, Value};

/// Produces the identifier attached to each expanded request.
pub trait RequestIdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs, one per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSource;

impl RequestIdSource for UuidSource {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Turns a template into concrete requests, one per dictionary row.
#[derive(Clone)]
pub struct Expander {
    evaluator: Evaluator,
    ids: Arc<dyn RequestIdSource>,
    seed: Bindings,
}

impl Expander {
    #[must_use]
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
            ids: Arc::new(UuidSource),
            seed: Bindings::new(),
        }
    }

    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn RequestIdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Bindings that win over template variables and dictionary columns.
    /// Each value is evaluated once, without access to other bindings, so
    /// call nodes in the seed never reach a resolved request.
    ///
    /// # Errors
    ///
    /// Returns the first evaluation error among the seed values.
    pub fn with_seed(mut self, seed: Bindings) -> EvalResult<Self> {
        let empty = Bindings::new();
        let ctx = EvalContext::new(&empty, None);
        let mut evaluated = Bindings::new();
        for (name, raw) in seed {
            let value = self.evaluator.evaluate(&raw, &ctx)?;
            evaluated.insert(name, value);
        }
        self.seed = evaluated;
        Ok(self)
    }

    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Expands `template` against `base_url`.
    ///
    /// The template's own `meta.request-id` takes precedence over
    /// `default_request_id`. Either every request is produced or none is.
    ///
    /// # Errors
    ///
    /// Returns an `ExpandError` tagged with the failing section when variable
    /// resolution or evaluation fails, when `query`/`headers`/`params` do
    /// not evaluate to mappings, or when a query/header request ID has no key.
    pub fn expand(
        &self,
        template: &RequestTemplate,
        base_url: &str,
        default_request_id: Option<&RequestIdConfig>,
    ) -> Result<Vec<ResolvedRequest>, ExpandError> {
        let id_config = template.request_id().or(default_request_id);
        if let Some(config) = id_config {
            check_request_id(config)?;
        }
        let source = template.source.path();
        let resolver = VariableResolver::new(&self.evaluator);

        let columns = self.dictionary_columns(template, source)?;
        let Some((_, first)) = columns.first() else {
            let bindings = resolver
                .resolve_all(&template.variables, &self.seed, source)
                .map_err(|err| eval_error(Section::Variables, err))?;
            return Ok(vec![self.build(template, base_url, &bindings, id_config)?]);
        };

        let rows = first.len();
        let short: Vec<&str> = columns
            .iter()
            .filter(|(_, items)| items.len() != rows)
            .map(|(name, _)| *name)
            .collect();
        if !short.is_empty() {
            warn!(
                "Dictionary columns {} differ in length from the first column ({} rows) in {}; missing entries bind null",
                short.join(", "),
                rows,
                template.source
            );
        }

        let mut requests = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut merged = template.variables.clone();
            for (name, items) in &columns {
                merged.insert(
                    (*name).to_owned(),
                    items.get(row).cloned().unwrap_or_default(),
                );
            }
            let bindings = resolver
                .resolve_all(&merged, &self.seed, source)
                .map_err(|err| eval_error(Section::Variables, err))?;
            requests.push(self.build(template, base_url, &bindings, id_config)?);
        }
        debug!("Expanded {} into {} request(s)", template.source, requests.len());
        Ok(requests)
    }

    /// Literal list columns are kept unevaluated so each row resolves its own
    /// entry; any other column is evaluated once and must yield the list.
    fn dictionary_columns<'tpl>(
        &self,
        template: &'tpl RequestTemplate,
        source: Option<&Path>,
    ) -> Result<Vec<(&'tpl str, Vec<Value>)>, ExpandError> {
        let ctx = EvalContext::new(&self.seed, source);
        let mut columns = Vec::with_capacity(template.dictionary.len());
        for (name, column) in &template.dictionary {
            let items = match column {
                Value::Sequence(items) => items.clone(),
                Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)
                | Value::Mapping(_) => {
                    match self
                        .evaluator
                        .evaluate(column, &ctx)
                        .map_err(|err| eval_error(Section::Variables, err))?
                    {
                        Value::Sequence(items) => items,
                        Value::Null => Vec::new(),
                        single @ (Value::Bool(_)
                        | Value::Number(_)
                        | Value::String(_)
                        | Value::Mapping(_)) => vec![single],
                    }
                }
            };
            columns.push((name.as_str(), items));
        }
        Ok(columns)
    }

    fn build(
        &self,
        template: &RequestTemplate,
        base_url: &str,
        bindings: &Bindings,
        id_config: Option<&RequestIdConfig>,
    ) -> Result<ResolvedRequest, ExpandError> {
        let ctx = EvalContext::new(bindings, template.source.path());
        let request_id = id_config.map(|_| self.ids.next_id());

        let mut path = self
            .evaluator
            .evaluate(&template.path, &ctx)
            .map_err(|err| eval_error(Section::Path, err))?
            .to_text();
        let mut query = self.mapping(template.query.as_ref(), Section::Query, &ctx)?;
        let mut headers = self.mapping(template.headers.as_ref(), Section::Headers, &ctx)?;

        if let (Some(config), Some(id)) = (id_config, request_id.as_deref()) {
            let key = config.key.clone().unwrap_or_default();
            match config.location {
                RequestIdLocation::PathHead => path = format!("/{id}{path}"),
                RequestIdLocation::PathTail => {
                    path.push('/');
                    path.push_str(id);
                }
                RequestIdLocation::Query => {
                    query.insert(key, Value::from(id));
                }
                RequestIdLocation::Header => {
                    headers.insert(key, Value::from(id));
                }
            }
        }

        let body = if template.params.is_some() {
            encode_form(&self.mapping(template.params.as_ref(), Section::Params, &ctx)?)
        } else if let Some(body) = &template.body {
            match self
                .evaluator
                .evaluate(body, &ctx)
                .map_err(|err| eval_error(Section::Body, err))?
            {
                Value::Null => String::new(),
                structured @ (Value::Sequence(_) | Value::Mapping(_)) => {
                    serde_json::to_string(&structured)
                        .map_err(|source| ExpandError::SerializeBody { source })?
                }
                scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
                    scalar.to_text()
                }
            }
        } else {
            String::new()
        };

        let request = materialize(RequestParts {
            method: template.method.clone(),
            base_url: base_url.to_owned(),
            path,
            query,
            headers,
            body,
            request_id,
        });
        debug!("Resolved {} {}", request.method, request.url);
        Ok(request)
    }

    fn mapping(
        &self,
        value: Option<&Value>,
        section: Section,
        ctx: &EvalContext<'_>,
    ) -> Result<Mapping, ExpandError> {
        let Some(value) = value else {
            return Ok(Mapping::new());
        };
        match self
            .evaluator
            .evaluate(value, ctx)
            .map_err(|err| eval_error(section, err))?
        {
            Value::Mapping(entries) => Ok(entries),
            Value::Null => Ok(Mapping::new()),
            other @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Sequence(_)) => {
                Err(ExpandError::NotAMapping {
                    section,
                    actual: other.type_name(),
                })
            }
        }
    }
}

fn eval_error(section: Section, source: EvalError) -> ExpandError {
    ExpandError::Eval { section, source }
}

fn check_request_id(config: &RequestIdConfig) -> Result<(), ExpandError> {
    match config.location {
        RequestIdLocation::PathHead | RequestIdLocation::PathTail => Ok(()),
        RequestIdLocation::Query | RequestIdLocation::Header => {
            if config.key.as_deref().is_some_and(|key| !key.trim().is_empty()) {
                Ok(())
            } else {
                Err(ExpandError::RequestIdKeyMissing {
                    location: config.location.as_str(),
                })
            }
        }
    }
}
