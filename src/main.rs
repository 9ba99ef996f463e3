mod app;
mod args;
mod config;
mod entry;
mod error;
mod http;
mod input;
mod logger;
mod output;
mod template;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
