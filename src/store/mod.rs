//! Row-store module.
//!
//! The voter register lives in an external Backend-as-a-Service. This module
//! exposes it through the [`RowStore`] trait (filter, sort, limit and count
//! on named tables, plus remote procedures) with two backends:
//!
//! - [`MemoryRowStore`]: in-process tables, optionally seeded from a JSON file.
//! - [`RestRowStore`]: PostgREST endpoint such as a Supabase project.

mod memory;
mod rest;
mod traits;

pub use memory::MemoryRowStore;
pub use rest::{build_query_params, parse_content_range, RestRowStore};
pub use traits::*;

use std::sync::Arc;

use crate::config::{StoreBackendType, StoreConfig};
use crate::error::Result;

/// Create a row-store backend from configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn RowStore>> {
    match config.backend {
        StoreBackendType::Memory => {
            let store = match config.data_file_path() {
                Some(path) => {
                    tracing::info!("Seeding memory store from: {}", path.display());
                    MemoryRowStore::from_file(path)?
                }
                None => MemoryRowStore::new(),
            };
            Ok(Arc::new(store))
        }
        StoreBackendType::Rest => Ok(Arc::new(RestRowStore::from_config(config)?)),
    }
}
