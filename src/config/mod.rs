//! Configuration for My Vote.

mod settings;

pub use settings::*;
