//! Seams between the poll pipeline and the outside world.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DispatchOutcome, NotificationPayload, Task};

/// Where due/overdue tasks come from.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch every task that is currently due today or overdue.
    async fn fetch_due_tasks(&self) -> Result<Vec<Task>>;
}

/// Where notifications go. Delivery never fails the caller: problems are
/// reported through the returned [`DispatchOutcome`].
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> DispatchOutcome;
}
