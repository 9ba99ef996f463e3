//! Result records and the json/csv/table writers.
mod record;
mod writers;


pub use record::{Metadata, ResultRecord};
pub use writers::{OutputFormat, render, write_output};
