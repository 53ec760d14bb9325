//! Run scheduler — drives the pipeline once, or on a cron schedule.
//! Scheduled runs are spawned as independent tokio tasks: nothing is shared
//! between them except the immutable pipeline, and a slow run does not hold
//! back the next tick.

use std::sync::Arc;

use chrono::{DateTime, Local};
use duebell_core::{CronSchedule, DuebellError, Result, RunMode};

use crate::pipeline::{Pipeline, RunReport};

pub struct RunScheduler {
    pipeline: Arc<Pipeline>,
    mode: RunMode,
}

impl RunScheduler {
    pub fn new(pipeline: Pipeline, mode: RunMode) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            mode,
        }
    }

    /// Immediate mode returns the report of its single run. Scheduled mode
    /// never returns `Ok`; it fails if the schedule runs out of fire times.
    pub async fn start(&self) -> Result<Option<RunReport>> {
        match &self.mode {
            RunMode::Immediate => {
                tracing::info!("Running once");
                self.pipeline.run().await.map(Some)
            }
            RunMode::Scheduled { schedule } => {
                run_scheduled(self.pipeline.clone(), schedule).await?;
                Ok(None)
            }
        }
    }
}

/// Sleep until each fire time and spawn a run. Only returns once the
/// schedule stops producing fire times.
async fn run_scheduled(pipeline: Arc<Pipeline>, schedule: &CronSchedule) -> Result<()> {
    tracing::info!("⏰ Starting cron schedule with params: {}", schedule);

    let mut last_fire: Option<DateTime<Local>> = None;
    let mut tick: u64 = 0;
    loop {
        let now = Local::now();
        // Never fire the same slot twice, even if the timer wakes early.
        let from = match last_fire {
            Some(last) if last > now => last,
            _ => now,
        };
        let Some(next) = schedule.next_after(&from) else {
            tracing::error!("Schedule '{}' has no further fire times; stopping", schedule);
            return Err(DuebellError::Cron(format!("'{schedule}' has no further fire times")));
        };
        tracing::debug!("Next run at {}", next.format("%Y-%m-%d %H:%M"));

        let delay = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(delay).await;

        last_fire = Some(next);
        tick += 1;
        spawn_run(pipeline.clone(), tick);
    }
}

/// One scheduled run. A failed query only ends this run.
fn spawn_run(pipeline: Arc<Pipeline>, tick: u64) {
    tokio::spawn(async move {
        tracing::info!("🔔 Cron task running (#{tick})...");
        if let Err(e) = pipeline.run().await {
            tracing::error!("Scheduled run #{tick} failed: {e}");
        }
    });
}
