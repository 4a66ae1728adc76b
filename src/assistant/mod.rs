//! Question answering over the voter register.
//!
//! Each question runs through a fixed sequence of stages:
//!
//! ```text
//! Idle -> Parsing -> Querying -> Summarizing -> Idle
//!                 \-> Skipped --/
//! ```
//!
//! Parsing asks the model for a [`QueryDescriptor`]; Querying runs it through
//! the [`ScopedExecutor`] under the caller's scope (general intents skip the
//! store entirely); Summarizing asks the model for a Malayalam answer built
//! from the gathered context. Nothing carries over between questions.

mod prompt;
mod transcript;

pub use prompt::{
    render_summary_prompt, user_message, GREETING, MISSING_KEY_MESSAGE, QUOTA_MESSAGE,
    UNAVAILABLE_MESSAGE,
};
pub use transcript::{Message, Speaker, Transcript};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info_span, warn, Instrument};

use crate::acl::Caller;
use crate::config::AssistantConfig;
use crate::llm::TextGenerator;
use crate::query::{ExecutionOutcome, IntentParser, QueryDescriptor, ScopedExecutor};
use crate::store::RowStore;

/// Pipeline stages for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Parsing,
    Querying,
    Skipped,
    Summarizing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Parsing => "parsing",
            Stage::Querying => "querying",
            Stage::Skipped => "skipped",
            Stage::Summarizing => "summarizing",
        };
        f.write_str(name)
    }
}

/// Basic statistics handed over when a data query fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    #[serde(rename = "totalVoters")]
    pub total_voters: Option<u64>,
}

/// What the summarizer gets to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerContext {
    /// Result of a count or list query.
    Data {
        #[serde(rename = "queryIntent")]
        query_intent: QueryDescriptor,
        result: ExecutionOutcome,
    },
    /// The data query failed; scoped totals only.
    BasicStats {
        #[serde(rename = "basicStats")]
        basic_stats: BasicStats,
        #[serde(rename = "appName")]
        app_name: String,
    },
    /// General conversation; no data was fetched.
    Static {
        #[serde(rename = "appName")]
        app_name: String,
    },
}

/// Everything produced for one question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub descriptor: QueryDescriptor,
    pub context: AnswerContext,
    pub text: String,
    /// Stages passed through, in order
    pub stages: Vec<Stage>,
}

/// Runs questions through parse, scoped query, and summarization.
pub struct Assistant {
    parser: IntentParser,
    executor: ScopedExecutor,
    generator: Arc<dyn TextGenerator>,
    app_name: String,
}

impl Assistant {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn RowStore>,
        config: &AssistantConfig,
    ) -> Self {
        Self {
            parser: IntentParser::new(generator.clone()),
            executor: ScopedExecutor::new(store, config),
            generator,
            app_name: config.app_name.clone(),
        }
    }

    pub fn parser(&self) -> &IntentParser {
        &self.parser
    }

    pub fn executor(&self) -> &ScopedExecutor {
        &self.executor
    }

    /// Answer one question for `caller`. Never fails; errors become a
    /// message the user can read.
    pub async fn answer(&self, caller: &Caller, question: &str) -> Answer {
        let mut stages = vec![Stage::Idle];

        stages.push(Stage::Parsing);
        debug!(stage = %Stage::Parsing, "Parsing question");
        let descriptor = self.parser.parse(question).await;
        debug!(descriptor = ?descriptor, "Parsed descriptor");

        let context = if descriptor.is_general() {
            stages.push(Stage::Skipped);
            self.static_context()
        } else {
            stages.push(Stage::Querying);
            self.gather(caller, &descriptor).await
        };

        stages.push(Stage::Summarizing);
        debug!(stage = %Stage::Summarizing, "Summarizing");
        let text = match self
            .generator
            .generate(&render_summary_prompt(question, &context))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                user_message(&e)
            }
        };

        stages.push(Stage::Idle);
        Answer {
            descriptor,
            context,
            text,
            stages,
        }
    }

    async fn gather(&self, caller: &Caller, descriptor: &QueryDescriptor) -> AnswerContext {
        match self.executor.execute(caller, descriptor).await {
            Ok(ExecutionOutcome::Skipped) => self.static_context(),
            Ok(result) => AnswerContext::Data {
                query_intent: descriptor.clone(),
                result,
            },
            Err(e) => {
                warn!(error = %e, "Data query failed, falling back to basic statistics");
                let total_voters = match self.executor.total_voters(caller).await {
                    Ok(total) => Some(total),
                    Err(e) => {
                        warn!(error = %e, "Voter total unavailable");
                        None
                    }
                };
                AnswerContext::BasicStats {
                    basic_stats: BasicStats { total_voters },
                    app_name: self.app_name.clone(),
                }
            }
        }
    }

    fn static_context(&self) -> AnswerContext {
        AnswerContext::Static {
            app_name: self.app_name.clone(),
        }
    }
}

/// A caller's conversation: one assistant, one scope, one transcript.
pub struct Session {
    assistant: Arc<Assistant>,
    caller: Caller,
    transcript: Transcript,
}

impl Session {
    pub fn new(assistant: Arc<Assistant>, caller: Caller) -> Self {
        Self {
            assistant,
            caller,
            transcript: Transcript::new(),
        }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record a question, answer it, and record the answer.
    ///
    /// Returns `None` for a blank question.
    pub async fn submit(&self, question: &str) -> Option<(u64, Answer)> {
        let seq = self.transcript.ask(question)?;
        let answer = self
            .assistant
            .answer(&self.caller, question.trim())
            .instrument(info_span!("question", seq, role = %self.caller.role()))
            .await;
        self.transcript.answer(seq, answer.text.clone());
        Some((seq, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, Result};
    use crate::store::MemoryRowStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Answers the parse prompt with a fixed descriptor and echoes the
    /// summary prompt's context line.
    struct Scripted {
        descriptor: &'static str,
        summaries_fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(descriptor: &'static str) -> Arc<Self> {
            Arc::new(Self {
                descriptor,
                summaries_fail: false,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            if prompt.starts_with("You are a database query parser") {
                return Ok(self.descriptor.to_string());
            }
            if self.summaries_fail {
                return Err(LlmError::RateLimited.into());
            }
            let context = prompt.rsplit("Context Data: ").next().unwrap_or_default();
            Ok(format!("summary of {}", context))
        }
    }

    fn store() -> Arc<MemoryRowStore> {
        Arc::new(
            MemoryRowStore::from_json(&json!({
                "booths": [{"id": 1, "name": "LP School", "booth_no": 1, "ward_id": 5}],
                "voters": [
                    {"id": 1, "sl_no": 1, "name": "Suresh", "gender": "Male", "booth_id": 1},
                    {"id": 2, "sl_no": 2, "name": "Lakshmi", "gender": "Female", "booth_id": 1}
                ]
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_general_question_skips_store() {
        let store = store();
        let generator = Scripted::new(r#"{"type": "general"}"#);
        let assistant = Assistant::new(generator, store.clone(), &AssistantConfig::default());

        let answer = assistant.answer(&Caller::Admin, "hello").await;
        assert_eq!(
            answer.stages,
            vec![Stage::Idle, Stage::Parsing, Stage::Skipped, Stage::Summarizing, Stage::Idle]
        );
        assert!(matches!(answer.context, AnswerContext::Static { .. }));
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_count_question_feeds_result_to_summary() {
        let store = store();
        let generator = Scripted::new(
            r#"{"type": "count", "table": "voters", "filters": [{"column": "gender", "operator": "eq", "value": "women"}]}"#,
        );
        let assistant = Assistant::new(generator, store, &AssistantConfig::default());

        let answer = assistant.answer(&Caller::Admin, "how many women").await;
        assert_eq!(answer.stages[2], Stage::Querying);
        assert_eq!(
            serde_json::to_value(&answer.context).unwrap(),
            json!({
                "queryIntent": {
                    "type": "count",
                    "table": "voters",
                    "filters": [{"column": "gender", "operator": "eq", "value": "Female"}]
                },
                "result": 1
            })
        );
        assert!(answer.text.starts_with("summary of {\"queryIntent\""));
    }

    #[tokio::test]
    async fn test_summary_failure_becomes_user_message() {
        let generator = Arc::new(Scripted {
            descriptor: r#"{"type": "general"}"#,
            summaries_fail: true,
            prompts: Mutex::new(Vec::new()),
        });
        let assistant = Assistant::new(generator, store(), &AssistantConfig::default());
        let answer = assistant.answer(&Caller::Admin, "hello").await;
        assert_eq!(answer.text, QUOTA_MESSAGE);
    }

    #[tokio::test]
    async fn test_session_records_exchange() {
        let generator = Scripted::new(r#"{"type": "list", "table": "voters"}"#);
        let assistant = Arc::new(Assistant::new(generator, store(), &AssistantConfig::default()));
        let session = Session::new(assistant, Caller::ward_member(5_i64, vec![]));

        assert!(session.submit("  ").await.is_none());

        let (seq, answer) = session.submit("list voters").await.unwrap();
        assert_eq!(seq, 1);
        match &answer.context {
            AnswerContext::Data { result, .. } => assert_eq!(result, &ExecutionOutcome::Rows(vec![])),
            other => panic!("unexpected context: {:?}", other),
        }
        assert_eq!(session.transcript().answer_for(seq).unwrap().text, answer.text);
        assert_eq!(session.transcript().len(), 3);
    }
}
