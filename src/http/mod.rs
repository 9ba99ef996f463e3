//! Dispatching resolved requests over HTTP.
mod sender;
mod types;

#[cfg(test)]
mod tests;

pub use sender::{Dispatch, DryRun, FORM_CONTENT_TYPE, Sender, SenderConfig, prepare_headers};
pub use types::{ResponseData, ResponseTiming};
