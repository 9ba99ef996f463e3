mod app;
mod config;
mod eval;
mod expand;
mod http;
mod input;
mod output;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use eval::{EvalError, EvalResult, RegistryError};
pub use expand::{ExpandError, Section};
pub use http::HttpError;
pub use input::InputError;
pub use output::OutputError;
pub use validation::ValidationError;
