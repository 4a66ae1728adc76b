//! CLI module for the My Vote command-line interface.
//!
//! Command handlers build the store, model client and caller from
//! configuration, run one operation, and print the result as text or JSON.

mod commands;
mod output;

pub use commands::*;
