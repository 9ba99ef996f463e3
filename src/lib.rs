//! Core library for the `s2req` CLI.
//!
//! This crate provides the building blocks used by the binary: the template
//! value model, the function registry and evaluator, variable resolution and
//! dictionary expansion, input parsing, the HTTP sender, and result writers.
//! The primary user-facing interface is the `s2req` command-line
//! application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod input;
pub mod output;
pub mod template;
