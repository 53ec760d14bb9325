//! # duebell-scheduler
//!
//! The poll pipeline and the two ways of driving it.
//!
//! ## Architecture
//! ```text
//! RunScheduler
//!   ├── Immediate → Pipeline::run once → RunReport
//!   └── Scheduled { "0 8-21/3 * * *" }
//!         └── every fire time → tokio::spawn(Pipeline::run)   (independent, may overlap)
//!
//! Pipeline::run
//!   TaskSource::fetch_due_tasks ──► for each Task (in order)
//!                                     ├── NotificationFormatter::format
//!                                     └── NotificationSink::send → DispatchOutcome
//! ```

pub mod engine;
pub mod pipeline;

pub use engine::RunScheduler;
pub use pipeline::{Pipeline, RunReport};
