//! One poll: fetch → format → deliver.

use std::sync::Arc;

use duebell_core::{DispatchOutcome, NotificationSink, PollConfig, Result, TaskSource};
use duebell_notion::{NotionClient, NotionTaskSource};
use duebell_notify::{GotifyDispatcher, NotificationFormatter};

/// Counters for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Tasks without a status; never formatted or sent.
    pub malformed: usize,
}

/// The poll pipeline. Holds no mutable state, so one instance can back any
/// number of concurrent runs.
pub struct Pipeline {
    source: Arc<dyn TaskSource>,
    sink: Arc<dyn NotificationSink>,
    formatter: NotificationFormatter,
    console: bool,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn TaskSource>,
        sink: Arc<dyn NotificationSink>,
        formatter: NotificationFormatter,
    ) -> Self {
        Self {
            source,
            sink,
            formatter,
            console: false,
        }
    }

    /// Notion source + Gotify sink as described by `config`.
    pub fn from_config(config: &PollConfig) -> Self {
        let client = NotionClient::new(&config.notion);
        let source = NotionTaskSource::new(client, config.database_id.clone(), &config.properties);
        let sink = GotifyDispatcher::new(config.gotify.as_ref());
        Self::new(
            Arc::new(source),
            Arc::new(sink),
            NotificationFormatter::new(config.backlink.clone()),
        )
    }

    /// Also print `"<glyph> <title>"` to stdout for every task.
    pub fn with_console_output(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Run once. Only a failed query is an error; per-task problems are
    /// logged and counted.
    pub async fn run(&self) -> Result<RunReport> {
        let tasks = self.source.fetch_due_tasks().await?;
        let mut report = RunReport {
            fetched: tasks.len(),
            ..RunReport::default()
        };
        tracing::info!("Found {} task(s) due today or overdue", tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let payload = match self.formatter.format(task) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Skipping malformed task: {e}");
                    report.malformed += 1;
                    continue;
                }
            };

            if self.console {
                println!("{}", NotificationFormatter::console_line(task).unwrap_or_default());
            } else {
                tracing::info!("Sending notification... ({} of {})", index + 1, tasks.len());
            }

            match self.sink.send(&payload).await {
                DispatchOutcome::Delivered => report.delivered += 1,
                DispatchOutcome::Skipped => report.skipped += 1,
                DispatchOutcome::Failed(failure) => {
                    tracing::warn!("Notification '{}' not delivered: {}", payload.title, failure);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Run finished: {} delivered, {} skipped, {} failed, {} malformed",
            report.delivered,
            report.skipped,
            report.failed,
            report.malformed
        );
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use duebell_core::{DispatchFailure, DuebellError, NotificationPayload, Task};
    use std::sync::Mutex;

    /// Returns the same tasks on every fetch.
    pub(crate) struct FixedSource(pub Vec<Task>);

    #[async_trait]
    impl TaskSource for FixedSource {
        async fn fetch_due_tasks(&self) -> Result<Vec<Task>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TaskSource for FailingSource {
        async fn fetch_due_tasks(&self) -> Result<Vec<Task>> {
            Err(DuebellError::Notion {
                status: 401,
                body: "unauthorized".into(),
            })
        }
    }

    /// Records every payload and answers with a fixed outcome.
    pub(crate) struct RecordingSink {
        pub sent: Mutex<Vec<NotificationPayload>>,
        outcome: DispatchOutcome,
    }

    impl RecordingSink {
        pub(crate) fn new(outcome: DispatchOutcome) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                outcome,
            }
        }

        pub(crate) fn sent(&self) -> Vec<NotificationPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, payload: &NotificationPayload) -> DispatchOutcome {
            self.sent.lock().unwrap().push(payload.clone());
            self.outcome.clone()
        }
    }

    fn chores() -> Vec<Task> {
        vec![Task::new("Dishes", "Due today"), Task::new("Trash", "3 days overdue")]
    }

    #[tokio::test]
    async fn test_each_task_sent_once_in_order() {
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Delivered));
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(chores())),
            sink.clone(),
            NotificationFormatter::default(),
        );

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.delivered, 2);

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].title, "👍 Dishes (Notion)");
        assert_eq!(sent[0].priority, 5);
        assert_eq!(sent[1].title, "💀 Trash (Notion)");
        assert_eq!(sent[1].message, "3 days overdue");
        assert_eq!(sent[1].priority, 6);
    }

    #[tokio::test]
    async fn test_empty_source_sends_nothing() {
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Delivered));
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(Vec::new())),
            sink.clone(),
            NotificationFormatter::default(),
        );

        assert_eq!(pipeline.run().await.unwrap(), RunReport::default());
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_run() {
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Failed(DispatchFailure {
            status: Some(500),
            detail: "boom".into(),
        })));
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(chores())),
            sink.clone(),
            NotificationFormatter::default(),
        );

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_task_skipped() {
        let tasks = vec![
            Task { title: Some("Ghost".into()), status: None },
            Task::new("Dishes", "Due today"),
        ];
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Delivered));
        let pipeline = Pipeline::new(Arc::new(FixedSource(tasks)), sink.clone(), NotificationFormatter::default());

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.malformed, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(sink.sent()[0].title, "👍 Dishes (Notion)");
    }

    #[tokio::test]
    async fn test_backlink_on_every_payload() {
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Delivered));
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(chores())),
            sink.clone(),
            NotificationFormatter::new(Some("https://notion.so/chores".into())),
        );

        pipeline.run().await.unwrap();
        assert!(sink
            .sent()
            .iter()
            .all(|p| p.extras.as_ref().map(|e| e.url()) == Some("https://notion.so/chores")));
    }

    #[tokio::test]
    async fn test_repeat_runs_are_identical() {
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Delivered));
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(chores())),
            sink.clone(),
            NotificationFormatter::default(),
        );

        pipeline.run().await.unwrap();
        pipeline.run().await.unwrap();
        let sent = sink.sent();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[..2], sent[2..]);
    }

    #[tokio::test]
    async fn test_query_failure_propagates() {
        let sink = Arc::new(RecordingSink::new(DispatchOutcome::Delivered));
        let pipeline = Pipeline::new(Arc::new(FailingSource), sink.clone(), NotificationFormatter::default());

        assert!(matches!(pipeline.run().await, Err(DuebellError::Notion { status: 401, .. })));
        assert!(sink.sent().is_empty());
    }
}
