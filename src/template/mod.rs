//! Request template expansion: the value tree, the function registry, the
//! evaluator, variable resolution, dictionary fan-out and materialization.

mod context;
mod eval;
mod expand;
pub mod functions;
mod materialize;
mod model;
mod registry;
mod resolver;
mod value;


pub use context::{Bindings, EvalContext};
pub use eval::{CALL_SIGILS, DEFAULT_MAX_DEPTH, Evaluator, call_target};
pub use expand::{Expander, RequestIdSource, UuidSource};
pub use materialize::{RequestParts, materialize};
pub use model::{
    MetaConfig, RequestIdConfig, RequestIdLocation, RequestTemplate, ResolvedRequest, Source,
};
pub use registry::{Builtin, BuiltinFn, Function, Registry};
pub use resolver::VariableResolver;
pub use value::{Mapping, Number, Value};
