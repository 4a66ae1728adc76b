//! CLI command handlers.

use std::sync::Arc;

use anyhow::Result;
use myvote::{
    create_client, create_store, store::OrderBy, suggest_name_variants, AclError, Assistant,
    Caller, Config, Filter, IntentParser, Role, RowStore, ScalarValue, ScopedExecutor, Table,
    Voter, VoterIndex,
};

use super::output;

/// Parse a CLI identifier, preferring an integer.
fn parse_id(raw: &str) -> ScalarValue {
    raw.trim()
        .parse::<i64>()
        .map(ScalarValue::from)
        .unwrap_or_else(|_| ScalarValue::from(raw.trim()))
}

async fn resolve_caller(store: &dyn RowStore, role: &str, ward: Option<String>) -> Result<Caller> {
    let role = Role::from_str(role).ok_or_else(|| AclError::UnknownRole(role.to_string()))?;
    let ward = ward.as_deref().map(parse_id);
    Ok(Caller::resolve(store, role, ward).await?)
}

/// Run the transliterate command.
pub fn run_transliterate(text: &str, json_output: bool) {
    output::print_transliteration(text, &myvote::transliterate(text), json_output);
}

/// Run the search command.
pub async fn run_search(
    config: &Config,
    term: &str,
    booth: Option<String>,
    expand: bool,
    role: &str,
    ward: Option<String>,
    json_output: bool,
) -> Result<()> {
    let store = create_store(&config.store)?;
    let caller = resolve_caller(store.as_ref(), role, ward).await?;
    let executor = ScopedExecutor::new(store.clone(), &config.assistant);

    let filters: Vec<Filter> = booth
        .as_deref()
        .map(|b| Filter::eq("booth_id", parse_id(b)))
        .into_iter()
        .collect();

    let rows = executor
        .list_rows(&caller, Table::Voters, &filters, Some(OrderBy::asc("sl_no")), None)
        .await?;
    let voters = rows
        .into_iter()
        .map(Voter::from_row)
        .collect::<myvote::Result<Vec<_>>>()?;
    let index = VoterIndex::new(voters);

    let terms = if expand {
        let client = create_client(&config.llm, Some(store))?;
        suggest_name_variants(client.as_ref(), term).await
    } else {
        vec![term.to_string()]
    };

    output::print_voters(&index.search_any(&terms), &terms, json_output);
    Ok(())
}

/// Run the parse command.
pub async fn run_parse(config: &Config, question: &str, json_output: bool) -> Result<()> {
    let store = create_store(&config.store)?;
    let client = create_client(&config.llm, Some(store))?;
    let descriptor = IntentParser::new(client).parse(question).await;
    output::print_descriptor(&descriptor, json_output);
    Ok(())
}

/// Run the ask command.
pub async fn run_ask(
    config: &Config,
    question: &str,
    role: &str,
    ward: Option<String>,
    json_output: bool,
) -> Result<()> {
    let store = create_store(&config.store)?;
    let caller = resolve_caller(store.as_ref(), role, ward).await?;
    let client = create_client(&config.llm, Some(store.clone()))?;
    let assistant = Arc::new(Assistant::new(client, store, &config.assistant));

    let answer = assistant.answer(&caller, question).await;
    output::print_answer(&answer, json_output);
    Ok(())
}

/// Run the variants command.
pub async fn run_variants(config: &Config, name: &str, json_output: bool) -> Result<()> {
    let store = create_store(&config.store)?;
    let client = create_client(&config.llm, Some(store))?;
    let variants = suggest_name_variants(client.as_ref(), name).await;
    output::print_variants(&variants, json_output);
    Ok(())
}

/// Run the check-key command.
pub async fn run_check_key(config: &Config, key: Option<String>, json_output: bool) -> Result<()> {
    let store = create_store(&config.store)?;
    let client = create_client(&config.llm, Some(store))?;

    let key = match key {
        Some(key) => key,
        None => match client.keys().resolve().await {
            Ok(key) => key.as_str().to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "No key to check");
                String::new()
            }
        },
    };

    let validation = client.validate_api_key(&key).await;
    output::print_key_validation(&validation, json_output);
    Ok(())
}
