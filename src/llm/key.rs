//! Lazily resolved API key.
//!
//! The key is looked up on first use and reused until it expires, is
//! invalidated after an authentication failure, or the owner reconfigures it.
//! Each resolver belongs to one session; there is no process-wide key.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use parking_lot::RwLock;

use crate::config::LlmConfig;
use crate::error::{LlmError, Result};
use crate::store::RowStore;

/// Remote procedure returning the key to restricted callers.
pub const KEY_PROCEDURE: &str = "get_openai_key";
/// `system_settings` row holding the key.
pub const KEY_SETTING: &str = "openai_api_key";
/// Environment variable holding the key.
pub const KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Where a key may come from, tried in order.
#[derive(Clone)]
pub enum KeySource {
    /// A fixed value, usually from configuration.
    Static(String),
    /// An environment variable.
    Env(String),
    /// A row-store remote procedure returning the key as a JSON string.
    Procedure(Arc<dyn RowStore>, String),
    /// A `system_settings` row.
    Setting(Arc<dyn RowStore>, String),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => write!(f, "Static(<redacted>)"),
            Self::Env(name) => write!(f, "Env({})", name),
            Self::Procedure(_, name) => write!(f, "Procedure({})", name),
            Self::Setting(_, key) => write!(f, "Setting({})", key),
        }
    }
}

impl KeySource {
    async fn lookup(&self) -> Option<String> {
        let key = match self {
            Self::Static(key) => Some(key.clone()),
            Self::Env(name) => std::env::var(name).ok(),
            Self::Procedure(store, function) => {
                match store.rpc(function, serde_json::json!({})).await {
                    Ok(value) => value.as_str().map(str::to_string),
                    Err(e) => {
                        tracing::warn!(error = %e, "RPC {} failed, trying next key source", function);
                        None
                    }
                }
            }
            Self::Setting(store, key) => match store.setting(key).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "Reading setting {} failed", key);
                    None
                }
            },
        };
        key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
    }
}

/// Session-owned API key cache.
pub struct ApiKeyResolver {
    sources: RwLock<Vec<KeySource>>,
    cache: Cache<(), Arc<String>>,
}

impl ApiKeyResolver {
    /// Create a resolver trying `sources` in order.
    pub fn new(sources: Vec<KeySource>, ttl: Duration) -> Self {
        Self {
            sources: RwLock::new(sources),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Standard lookup chain: configured key, environment, row-store
    /// procedure, then the settings table.
    pub fn from_config(config: &LlmConfig, store: Option<Arc<dyn RowStore>>) -> Self {
        let mut sources = Vec::new();
        if let Some(key) = &config.api_key {
            sources.push(KeySource::Static(key.clone()));
        }
        sources.push(KeySource::Env(KEY_ENV_VAR.to_string()));
        if let Some(store) = store {
            sources.push(KeySource::Procedure(store.clone(), KEY_PROCEDURE.to_string()));
            sources.push(KeySource::Setting(store, KEY_SETTING.to_string()));
        }
        Self::new(sources, Duration::from_secs(config.key_ttl_secs))
    }

    /// Resolve the key, reusing a cached value when present.
    ///
    /// A failed lookup is not cached, so the next call tries again.
    pub async fn resolve(&self) -> Result<Arc<String>> {
        let sources = self.sources.read().clone();
        self.cache
            .optionally_get_with((), async move {
                for source in &sources {
                    if let Some(key) = source.lookup().await {
                        tracing::debug!(source = ?source, "Resolved API key");
                        return Some(Arc::new(key));
                    }
                }
                None
            })
            .await
            .ok_or_else(|| LlmError::MissingApiKey.into())
    }

    /// Drop the cached key so the next call looks it up again.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }

    /// Replace the lookup chain and drop the cached key.
    pub async fn reconfigure(&self, sources: Vec<KeySource>) {
        *self.sources.write() = sources;
        self.invalidate().await;
    }
}
