//! # duebell-notion
//!
//! Everything that talks to Notion: building the due/overdue query,
//! running it (with pagination), listing databases, and flattening the
//! raw page records into [`duebell_core::Task`]s.

pub mod client;
pub mod normalize;
pub mod query;

pub use client::{DatabaseSummary, NotionClient, NotionTaskSource};
pub use normalize::ResultNormalizer;
pub use query::{QueryBuilder, QueryRequest};
