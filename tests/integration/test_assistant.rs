//! Assistant pipeline end to end.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use myvote::assistant::{MISSING_KEY_MESSAGE, UNAVAILABLE_MESSAGE};
use myvote::config::{AssistantConfig, LlmConfig};
use myvote::store::{QueryOutput, RowQuery, Selection};
use myvote::{
    AnswerContext, ApiKeyResolver, Assistant, Caller, ChatCompletionClient, ExecutionOutcome,
    IntentType, MemoryRowStore, RowStore, Session, Stage, StoreError, Table, TextGenerator,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Replies to parse prompts with a fixed string and to summary prompts with
/// the unavailable phrase when the context has no query result.
struct ScriptedModel {
    parse_reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(parse_reply: &str) -> Arc<Self> {
        Arc::new(Self {
            parse_reply: parse_reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn summary_context(&self) -> Value {
        let prompts = self.prompts.lock();
        let last = prompts.last().expect("no prompt sent");
        let context = last.rsplit("Context Data: ").next().unwrap();
        serde_json::from_str(context).unwrap()
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, prompt: &str) -> myvote::Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if prompt.starts_with("You are a database query parser") {
            Ok(self.parse_reply.clone())
        } else if prompt.contains("\"result\"") {
            Ok("• പേര്: സുരേഷ്".to_string())
        } else {
            Ok(UNAVAILABLE_MESSAGE.to_string())
        }
    }
}

/// Fails every row query; counts still succeed.
struct RowsUnavailable(MemoryRowStore);

#[async_trait]
impl RowStore for RowsUnavailable {
    async fn query(&self, query: &RowQuery) -> myvote::Result<QueryOutput> {
        match query.selection {
            Selection::Rows { .. } => Err(StoreError::Connection("connection reset".to_string()).into()),
            Selection::Count => self.0.query(query).await,
        }
    }

    async fn rpc(&self, function: &str, args: Value) -> myvote::Result<Value> {
        self.0.rpc(function, args).await
    }

    async fn setting(&self, key: &str) -> myvote::Result<Option<String>> {
        self.0.setting(key).await
    }
}

fn memory_store() -> MemoryRowStore {
    MemoryRowStore::from_json(&json!({
        "booths": [{"id": 1, "name": "LP School", "booth_no": 1, "ward_id": 9}],
        "voters": [
            {"id": 1, "sl_no": 1, "name": "Suresh", "gender": "Male", "booth_id": 1},
            {"id": 2, "sl_no": 2, "name": "Sureshkumar", "gender": "Male", "booth_id": 1},
            {"id": 3, "sl_no": 3, "name": "Lakshmi", "gender": "Female", "booth_id": 1}
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_malayalam_name_lookup() {
    let model = ScriptedModel::new(
        "```json\n{\"type\": \"list\", \"table\": \"voters\", \"filters\": [{\"column\": \"name\", \"operator\": \"ilike\", \"value\": \"സുരേഷ്\"}]}\n```",
    );
    let assistant = Assistant::new(model.clone(), Arc::new(memory_store()), &AssistantConfig::default());

    let answer = assistant.answer(&Caller::Admin, "സുരേഷിന്റെ ബൂത്ത് ഏത്?").await;

    assert_eq!(answer.descriptor.intent, IntentType::List);
    assert_eq!(answer.descriptor.table, Some(Table::Voters));
    assert_eq!(answer.text, "• പേര്: സുരേഷ്");

    let context = model.summary_context();
    assert_eq!(context["queryIntent"]["filters"][0]["value"], "suresh");
    let result = context["result"].as_array().unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["booths"]["name"], "LP School");
}

#[tokio::test]
async fn test_unparseable_reply_degrades_to_general() {
    let model = ScriptedModel::new("Sorry, I cannot help with that.");
    let store = Arc::new(memory_store());
    let assistant = Assistant::new(model.clone(), store.clone(), &AssistantConfig::default());

    let answer = assistant.answer(&Caller::Admin, "tell me a joke").await;

    assert!(answer.descriptor.is_general());
    assert_eq!(answer.stages[2], Stage::Skipped);
    assert_eq!(store.query_count(), 0);
    assert_eq!(model.summary_context(), json!({"appName": "എന്റെ വോട്ട് (My Vote)"}));
}

#[tokio::test]
async fn test_store_failure_falls_back_to_scoped_stats() {
    let model = ScriptedModel::new(r#"{"type": "list", "table": "voters"}"#);
    let store = Arc::new(RowsUnavailable(memory_store()));
    let assistant = Assistant::new(model.clone(), store, &AssistantConfig::default());

    let caller = Caller::ward_member(9_i64, vec![1_i64.into()]);
    let answer = assistant.answer(&caller, "list voters").await;

    assert!(matches!(answer.context, AnswerContext::BasicStats { .. }));
    assert_eq!(answer.text, UNAVAILABLE_MESSAGE);
    assert_eq!(
        model.summary_context(),
        json!({"basicStats": {"totalVoters": 3}, "appName": "എന്റെ വോട്ട് (My Vote)"})
    );

    let outsider = Caller::ward_member(4_i64, vec![]);
    assistant.answer(&outsider, "list voters").await;
    assert_eq!(model.summary_context()["basicStats"]["totalVoters"], 0);
}

#[tokio::test]
async fn test_missing_api_key_message() {
    let keys = Arc::new(ApiKeyResolver::new(Vec::new(), Duration::from_secs(60)));
    let client = Arc::new(ChatCompletionClient::from_config(&LlmConfig::default(), keys).unwrap());
    let store = Arc::new(memory_store());
    let assistant = Assistant::new(client, store.clone(), &AssistantConfig::default());

    let answer = assistant.answer(&Caller::Admin, "how many voters").await;

    assert!(answer.descriptor.is_general());
    assert_eq!(answer.text, MISSING_KEY_MESSAGE);
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_session_transcript() {
    let model = ScriptedModel::new(r#"{"type": "count", "table": "voters", "limit": 2}"#);
    let assistant = Arc::new(Assistant::new(model, Arc::new(memory_store()), &AssistantConfig::default()));
    let session = Session::new(assistant, Caller::Admin);

    let (first, answer) = session.submit("how many voters?").await.unwrap();
    assert_eq!(
        serde_json::to_value(&answer.context).unwrap()["result"],
        json!(3)
    );
    assert!(matches!(
        answer.context,
        AnswerContext::Data { result: ExecutionOutcome::Count(3), .. }
    ));

    assert!(session.submit("").await.is_none());
    let (second, _) = session.submit("again").await.unwrap();
    assert!(second > first);

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0].text, myvote::assistant::GREETING);
}
