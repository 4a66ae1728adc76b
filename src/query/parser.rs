//! Intent parser.
//!
//! Model output is untrusted. It is reduced to a [`QueryDescriptor`] only
//! after every field has been checked against the known tables, columns and
//! operators; anything that fails a check collapses to the general intent.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::prompt::{render_parse_prompt, FEMALE_TERMS, MALE_TERMS};
use super::types::{Filter, FilterOp, IntentType, QueryDescriptor, ScalarValue, Table};
use crate::llm::TextGenerator;
use crate::transliteration::{contains_malayalam, transliterate};

static EDGE_WILDCARDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[%*\s]+|[%*\s]+$").expect("Invalid regex"));

/// Why a model response was not accepted.
#[derive(Debug, Error)]
enum Rejection {
    #[error("no JSON object found")]
    NoObject,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top-level value is not an object")]
    NotAnObject,

    #[error("unknown intent type {0:?}")]
    UnknownType(String),

    #[error("{0} intent without a table")]
    MissingTable(IntentType),

    #[error("unknown table {0:?}")]
    UnknownTable(String),

    #[error("filters is not a list")]
    MalformedFilters,

    #[error("filter {0} is malformed")]
    MalformedFilter(usize),

    #[error("unknown column {column:?} on {table}")]
    UnknownColumn { table: Table, column: String },

    #[error("unknown operator {0:?}")]
    UnknownOperator(String),

    #[error("non-scalar value for column {0:?}")]
    InvalidValue(String),
}

// ============================================================================
// Extraction
// ============================================================================

/// The text between the first `{` and the last `}`, inclusive.
///
/// Tolerates code fences and prose around the object. Returns `None` when
/// there is no such pair.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Turn raw model output into a descriptor, degrading to general on any
/// problem.
pub fn interpret(text: &str) -> QueryDescriptor {
    match validate(text) {
        Ok(descriptor) => descriptor,
        Err(reason) => {
            tracing::warn!(%reason, "Rejected model output, treating question as general");
            QueryDescriptor::general()
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate(text: &str) -> Result<QueryDescriptor, Rejection> {
    let json = extract_json_object(text).ok_or(Rejection::NoObject)?;
    let value: Value = serde_json::from_str(json)?;
    let object = value.as_object().ok_or(Rejection::NotAnObject)?;

    let intent = match object.get("type") {
        Some(Value::String(s)) => {
            IntentType::from_str(s).ok_or_else(|| Rejection::UnknownType(s.clone()))?
        }
        other => return Err(Rejection::UnknownType(describe(other))),
    };

    if intent == IntentType::General {
        return Ok(QueryDescriptor::general());
    }

    let table = match object.get("table") {
        Some(Value::String(s)) => {
            Table::from_str(s).ok_or_else(|| Rejection::UnknownTable(s.clone()))?
        }
        None | Some(Value::Null) => return Err(Rejection::MissingTable(intent)),
        Some(other) => return Err(Rejection::UnknownTable(other.to_string())),
    };

    let filters = match object.get("filters") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| validate_filter(table, i, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(Rejection::MalformedFilters),
    };

    let limit = match intent {
        IntentType::List => object.get("limit").and_then(positive_limit),
        _ => None,
    };

    Ok(QueryDescriptor {
        intent,
        table: Some(table),
        filters,
        limit,
    })
}

fn validate_filter(table: Table, index: usize, item: &Value) -> Result<Filter, Rejection> {
    let object = item.as_object().ok_or(Rejection::MalformedFilter(index))?;

    let column = object
        .get("column")
        .and_then(Value::as_str)
        .ok_or(Rejection::MalformedFilter(index))?
        .trim()
        .to_string();
    if !table.has_column(&column) {
        return Err(Rejection::UnknownColumn { table, column });
    }

    let operator = object
        .get("operator")
        .and_then(Value::as_str)
        .ok_or(Rejection::MalformedFilter(index))?;
    let operator =
        FilterOp::from_str(operator).ok_or_else(|| Rejection::UnknownOperator(operator.to_string()))?;

    let value = object
        .get("value")
        .and_then(ScalarValue::from_json)
        .ok_or_else(|| Rejection::InvalidValue(column.clone()))?;

    Ok(normalize(Filter {
        column,
        operator,
        value,
    }))
}

/// Canonicalize values the store compares exactly.
fn normalize(mut filter: Filter) -> Filter {
    if filter.column == "gender" {
        if let Some(gender) = filter.value.as_text().and_then(normalize_gender) {
            filter.operator = FilterOp::Eq;
            filter.value = ScalarValue::from(gender);
        }
        return filter;
    }

    if filter.operator == FilterOp::Ilike {
        if let ScalarValue::Text(text) = &filter.value {
            let mut text = EDGE_WILDCARDS.replace_all(text, "").into_owned();
            if contains_malayalam(&text) {
                text = transliterate(&text);
            }
            filter.value = ScalarValue::Text(text);
        }
    }
    filter
}

/// Map a gender word in any supported language to `Male` or `Female`.
pub fn normalize_gender(value: &str) -> Option<&'static str> {
    let lower = value.trim().to_lowercase();
    if lower == "m" || MALE_TERMS.contains(&lower.as_str()) {
        Some("Male")
    } else if lower == "f" || FEMALE_TERMS.contains(&lower.as_str()) {
        Some("Female")
    } else {
        None
    }
}

fn positive_limit(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().filter(|&n| n > 0).map(|n| n as usize),
        Value::String(s) => s.trim().parse::<usize>().ok().filter(|&n| n > 0),
        _ => None,
    }
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "<missing>".to_string(), Value::to_string)
}

// ============================================================================
// Parser
// ============================================================================

/// Turns questions into descriptors through a text generator.
pub struct IntentParser {
    generator: Arc<dyn TextGenerator>,
}

impl IntentParser {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Parse a question. Never fails: generator errors and unusable output
    /// both yield the general intent.
    pub async fn parse(&self, question: &str) -> QueryDescriptor {
        let prompt = render_parse_prompt(question);
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                tracing::debug!(model = self.generator.model(), response = %text, "Parse response");
                interpret(&text)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intent parse call failed, treating question as general");
                QueryDescriptor::general()
            }
        }
    }
}
