//! Text generation trait definitions.

use async_trait::async_trait;

/// Stateless, single-turn text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a prompt.
    async fn generate(&self, prompt: &str) -> crate::error::Result<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str {
        "unknown"
    }
}
