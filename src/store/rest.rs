//! PostgREST row-store client (Supabase-compatible).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::traits::{Predicate, QueryOutput, Row, RowQuery, RowStore, Selection};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::query::ScalarValue;

/// Row-store backed by a PostgREST endpoint.
pub struct RestRowStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestRowStore {
    /// Create a REST store from configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| StoreError::Connection("store.url is not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SUPABASE_ANON_KEY").ok())
            .ok_or_else(|| {
                StoreError::Connection(
                    "API key not provided and SUPABASE_ANON_KEY env var not set".to_string(),
                )
            })?;
        Self::new(&url, &api_key, config.timeout_secs)
    }

    /// Create a REST store with explicit parameters.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Connection("Request timed out".to_string())
            } else if e.is_connect() {
                StoreError::Connection(format!("Connection failed: {}", e))
            } else {
                StoreError::Query(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(StoreError::Query(format!("{} ({})", error_text, status)).into())
        }
    }
}

#[async_trait]
impl RowStore for RestRowStore {
    async fn query(&self, query: &RowQuery) -> Result<QueryOutput> {
        let url = format!("{}/rest/v1/{}", self.base_url, query.table);
        let params = build_query_params(query);

        match query.selection {
            Selection::Count => {
                let request = self
                    .client
                    .head(&url)
                    .query(&params)
                    .header("Prefer", "count=exact");
                let response = self.send(request).await?;
                let range = response
                    .headers()
                    .get("content-range")
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| StoreError::Response("missing Content-Range header".to_string()))?;
                let count = parse_content_range(range).ok_or_else(|| {
                    StoreError::Response(format!("unparseable Content-Range `{}`", range))
                })?;
                Ok(QueryOutput::Count(count))
            }
            Selection::Rows { .. } => {
                let request = self.client.get(&url).query(&params);
                let response = self.send(request).await?;
                let rows: Vec<Row> = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Response(format!("Failed to parse rows: {}", e)))?;
                Ok(QueryOutput::Rows(rows))
            }
        }
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let request = self.client.post(&url).json(&args);
        let response = self
            .send(request)
            .await
            .map_err(|e| StoreError::Rpc(function.to_string(), e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Rpc(function.to_string(), e.to_string()).into())
    }

    async fn setting(&self, key: &str) -> Result<Option<String>> {
        let url = format!("{}/rest/v1/system_settings", self.base_url);
        let params = [
            ("select".to_string(), "value".to_string()),
            ("key".to_string(), format!("eq.{}", key)),
            ("limit".to_string(), "1".to_string()),
        ];
        let response = self.send(self.client.get(&url).query(&params)).await?;
        let rows: Vec<Row> = response
            .json()
            .await
            .map_err(|e| StoreError::Response(format!("Failed to parse settings: {}", e)))?;
        Ok(rows
            .first()
            .and_then(|row| row.get("value"))
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }
}

// ============================================================================
// PostgREST encoding
// ============================================================================

/// Encode a query as PostgREST URL parameters.
pub fn build_query_params(query: &RowQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    let select = match query.selection {
        Selection::Count => "*".to_string(),
        Selection::Rows { .. } if query.embed => query.table.select_clause(),
        Selection::Rows { .. } => "*".to_string(),
    };
    params.push(("select".to_string(), select));

    for predicate in &query.predicates {
        params.push(encode_predicate(predicate));
    }

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    if let Selection::Rows { limit: Some(limit) } = query.selection {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn encode_predicate(predicate: &Predicate) -> (String, String) {
    match predicate {
        Predicate::Compare { column, op, value } => (column.clone(), format!("{}.{}", op, value)),
        Predicate::In { column, values } => {
            let list: Vec<String> = values.iter().map(encode_list_item).collect();
            (column.clone(), format!("in.({})", list.join(",")))
        }
        // `id=in.()` is valid PostgREST and matches nothing
        Predicate::Unsatisfiable => ("id".to_string(), "in.()".to_string()),
    }
}

fn encode_list_item(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Text(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => other.to_string(),
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}
