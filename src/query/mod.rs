//! Query intent translation for My Vote.
//!
//! This module provides:
//! - The [`QueryDescriptor`] vocabulary (tables, intents, filters)
//! - The prompt contract sent to the language model
//! - Fail-soft parsing and strict validation of the model's answer
//! - The [`ScopedExecutor`], the single path from descriptors to the row-store

pub mod executor;
pub mod parser;
pub mod prompt;
pub mod types;

pub use executor::*;
pub use parser::*;
pub use prompt::{render_parse_prompt, SCHEMA_VERSION};
pub use types::*;
