//! Error types for My Vote.

use thiserror::Error;

/// Main error type for My Vote operations.
#[derive(Error, Debug)]
pub enum MyVoteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Row-store error: {0}")]
    Store(#[from] StoreError),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Access error: {0}")]
    Acl(#[from] AclError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Row-store errors (memory or REST backend).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Remote procedure `{0}` failed: {1}")]
    Rpc(String, String),

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("Failed to load seed data: {0}")]
    Seed(String),
}

/// Language-model API errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Empty completion")]
    EmptyCompletion,
}

/// Caller resolution errors.
#[derive(Error, Debug)]
pub enum AclError {
    #[error("Ward member has no assigned ward")]
    MissingWard,

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Result type alias for My Vote operations.
pub type Result<T> = std::result::Result<T, MyVoteError>;
