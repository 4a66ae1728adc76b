//! My Vote: voter-register search and question answering
//!
//! Malayalam/Manglish voter-name search backed by a deterministic
//! transliteration engine, and a natural-language assistant that turns
//! questions into validated, scope-restricted row-store queries.

pub mod acl;
pub mod assistant;
pub mod config;
pub mod error;
pub mod llm;
pub mod query;
pub mod search;
pub mod store;
pub mod transliteration;

pub use acl::{apply_scope, Caller, Role};
pub use assistant::{Answer, AnswerContext, Assistant, BasicStats, Session, Stage, Transcript};
pub use config::Config;
pub use error::{AclError, ConfigError, LlmError, MyVoteError, Result, StoreError};
pub use llm::{
    create_client, ApiKeyResolver, ChatCompletionClient, KeySource, KeyValidation, TextGenerator,
};
pub use query::{
    extract_json_object, interpret, ExecutionOutcome, Filter, FilterOp, IntentParser, IntentType,
    QueryDescriptor, ScalarValue, ScopedExecutor, Table,
};
pub use search::{suggest_name_variants, Voter, VoterIndex};
pub use store::{create_store, MemoryRowStore, RestRowStore, Row, RowStore};
pub use transliteration::{contains_malayalam, transliterate};
