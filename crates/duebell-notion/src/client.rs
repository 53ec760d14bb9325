//! Notion API client — database query with pagination and database listing.

use async_trait::async_trait;
use duebell_core::error::{DuebellError, Result};
use duebell_core::{NotionSettings, PropertyNames, Task, TaskSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::ResultNormalizer;
use crate::query::{PAGE_SIZE, QueryBuilder, QueryRequest};

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// One page of a paginated Notion list response.
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// A database visible to the integration token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseSummary {
    pub id: String,
    pub title: String,
}

impl DatabaseSummary {
    fn from_record(record: &Value) -> Self {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let title = record
            .get("title")
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("plain_text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { id, title }
    }
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    filter: SearchFilter<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
    page_size: u32,
}

#[derive(Debug, Serialize)]
struct SearchFilter<'a> {
    property: &'a str,
    value: &'a str,
}

/// Thin reqwest wrapper around the Notion REST API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl NotionClient {
    pub fn new(settings: &NotionSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: settings.token.clone(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn post_page<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ListPage> {
        tracing::debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| DuebellError::Http(format!("Notion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DuebellError::Notion {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| DuebellError::Http(format!("Invalid Notion response: {e}")))
    }

    /// Run a database query, following `next_cursor` until every page is read.
    pub async fn query_database(&self, request: &QueryRequest) -> Result<Vec<Value>> {
        let mut results = Vec::new();
        let mut page_request = request.clone();
        loop {
            let page = self.post_page(&page_request.path(), &page_request.body).await?;
            results.extend(page.results);
            match page.next_cursor {
                Some(cursor) if page.has_more => page_request = request.with_cursor(cursor),
                _ => break,
            }
        }
        tracing::debug!("Query on {} returned {} record(s)", request.database_id, results.len());
        Ok(results)
    }

    /// Every database shared with the integration.
    pub async fn list_databases(&self) -> Result<Vec<DatabaseSummary>> {
        let mut databases = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let body = SearchBody {
                filter: SearchFilter {
                    property: "object",
                    value: "database",
                },
                start_cursor: cursor.as_deref(),
                page_size: PAGE_SIZE,
            };
            let page = self.post_page("/v1/search", &body).await?;
            databases.extend(page.results.iter().map(DatabaseSummary::from_record));
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        Ok(databases)
    }
}

/// [`TaskSource`] backed by one Notion database.
#[derive(Debug, Clone)]
pub struct NotionTaskSource {
    client: NotionClient,
    database_id: String,
    builder: QueryBuilder,
    normalizer: ResultNormalizer,
}

impl NotionTaskSource {
    pub fn new(client: NotionClient, database_id: impl Into<String>, properties: &PropertyNames) -> Self {
        Self {
            client,
            database_id: database_id.into(),
            builder: QueryBuilder::new(properties.clone()),
            normalizer: ResultNormalizer::new(properties.clone()),
        }
    }
}

#[async_trait]
impl TaskSource for NotionTaskSource {
    async fn fetch_due_tasks(&self) -> Result<Vec<Task>> {
        let request = self.builder.due_or_overdue(&self.database_id);
        let results = self.client.query_database(&request).await?;
        Ok(self.normalizer.normalize(&results))
    }
}
