//! Language-model module.
//!
//! Prompts go to an OpenAI-compatible chat completion endpoint through the
//! [`TextGenerator`] trait, so the parser and the assistant can be driven by
//! a scripted generator in tests.
//!
//! The API key is never part of the build. [`ApiKeyResolver`] looks it up at
//! first use (configuration, environment, row-store procedure, settings
//! table) and caches it for the session.

mod api;
mod key;
mod traits;

pub use api::{ChatCompletionClient, KeyValidation};
pub use key::{ApiKeyResolver, KeySource, KEY_ENV_VAR, KEY_PROCEDURE, KEY_SETTING};
pub use traits::TextGenerator;

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::store::RowStore;

/// Create a chat completion client with the standard key lookup chain.
pub fn create_client(
    config: &LlmConfig,
    store: Option<Arc<dyn RowStore>>,
) -> Result<Arc<ChatCompletionClient>> {
    let keys = Arc::new(ApiKeyResolver::from_config(config, store));
    Ok(Arc::new(ChatCompletionClient::from_config(config, keys)?))
}
