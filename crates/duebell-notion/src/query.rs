//! Database query construction — "status contains Due today OR overdue",
//! sorted by status descending.

use duebell_core::PropertyNames;
use serde::Serialize;

/// Status text marking an item as due today.
pub const DUE_TODAY_MARKER: &str = "Due today";
/// Status text marking an item as overdue.
pub const OVERDUE_MARKER: &str = "overdue";
/// Notion's maximum page size.
pub const PAGE_SIZE: u32 = 100;

/// A database query ready to submit: the target database plus the JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub database_id: String,
    pub body: QueryBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryBody {
    pub filter: CompoundFilter,
    pub sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundFilter {
    pub or: Vec<PropertyFilter>,
}

/// Text filter on a formula property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyFilter {
    pub property: String,
    pub formula: FormulaCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaCondition {
    pub string: TextCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextCondition {
    pub contains: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl PropertyFilter {
    fn contains(property: &str, text: &str) -> Self {
        Self {
            property: property.to_string(),
            formula: FormulaCondition {
                string: TextCondition {
                    contains: text.to_string(),
                },
            },
        }
    }
}

/// Builds the due/overdue query for the configured property names.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    properties: PropertyNames,
}

impl QueryBuilder {
    pub fn new(properties: PropertyNames) -> Self {
        Self { properties }
    }

    /// First page of the due-today-or-overdue query for `database_id`.
    pub fn due_or_overdue(&self, database_id: &str) -> QueryRequest {
        let status = &self.properties.status;
        QueryRequest {
            database_id: database_id.to_string(),
            body: QueryBody {
                filter: CompoundFilter {
                    or: vec![
                        PropertyFilter::contains(status, DUE_TODAY_MARKER),
                        PropertyFilter::contains(status, OVERDUE_MARKER),
                    ],
                },
                sorts: vec![Sort {
                    property: status.clone(),
                    direction: SortDirection::Descending,
                }],
                start_cursor: None,
                page_size: PAGE_SIZE,
            },
        }
    }
}

impl QueryRequest {
    /// Same query, continuing from `cursor`.
    pub fn with_cursor(&self, cursor: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.body.start_cursor = Some(cursor.into());
        next
    }

    /// API path relative to the Notion base URL.
    pub fn path(&self) -> String {
        format!("/v1/databases/{}/query", self.database_id)
    }
}
