//! Raw Notion page records → [`Task`].
//!
//! A straight map: one Task per record, in order. Missing or oddly shaped
//! properties become `None`; nothing is dropped here.

use duebell_core::{PropertyNames, Task};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    properties: PropertyNames,
}

impl ResultNormalizer {
    pub fn new(properties: PropertyNames) -> Self {
        Self { properties }
    }

    pub fn normalize(&self, results: &[Value]) -> Vec<Task> {
        results.iter().map(|r| self.normalize_record(r)).collect()
    }

    /// `properties.<title>.title[0].plain_text` and
    /// `properties.<status>.formula.string`.
    pub fn normalize_record(&self, record: &Value) -> Task {
        let properties = record.get("properties");

        let title = properties
            .and_then(|p| p.get(&self.properties.title))
            .and_then(|t| t.get("title"))
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("plain_text"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let status = properties
            .and_then(|p| p.get(&self.properties.status))
            .and_then(|s| s.get("formula"))
            .and_then(|f| f.get("string"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Task { title, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(title: &str, status: &str) -> Value {
        json!({
            "object": "page",
            "properties": {
                "Task": { "type": "title", "title": [{ "plain_text": title }] },
                "Status": { "type": "formula", "formula": { "type": "string", "string": status } }
            }
        })
    }

    #[test]
    fn test_normalize_keeps_order() {
        let normalizer = ResultNormalizer::new(PropertyNames::default());
        let tasks = normalizer.normalize(&[page("Dishes", "Due today"), page("Trash", "3 days overdue")]);
        assert_eq!(
            tasks,
            vec![Task::new("Dishes", "Due today"), Task::new("Trash", "3 days overdue")]
        );
    }

    #[test]
    fn test_empty_results() {
        let normalizer = ResultNormalizer::new(PropertyNames::default());
        assert!(normalizer.normalize(&[]).is_empty());
    }

    #[test]
    fn test_malformed_record_becomes_absent_fields() {
        let normalizer = ResultNormalizer::new(PropertyNames::default());
        let records = [
            json!({ "object": "page" }),
            json!({ "properties": { "Task": { "title": [] }, "Status": { "formula": { "string": null } } } }),
        ];
        let tasks = normalizer.normalize(&records);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.title.is_none() && t.status.is_none()));
    }

    #[test]
    fn test_custom_property_names() {
        let normalizer = ResultNormalizer::new(PropertyNames {
            status: "Due".into(),
            title: "Name".into(),
        });
        let record = json!({
            "properties": {
                "Name": { "title": [{ "plain_text": "Laundry" }] },
                "Due": { "formula": { "string": "Due today" } }
            }
        });
        assert_eq!(normalizer.normalize_record(&record), Task::new("Laundry", "Due today"));
    }
}
