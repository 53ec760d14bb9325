//! # duebell-core
//!
//! Shared building blocks for duebell: the validated [`config::Config`],
//! the crate-wide [`error::DuebellError`], the transient data model
//! ([`types::Task`], [`types::NotificationPayload`]) and the cron parser
//! that drives scheduled mode.
//!
//! ```text
//! Settings (flags / env / .env)
//!   └── Config::from_settings
//!         ├── ListDatabases { notion }
//!         └── Poll(PollConfig)
//!               ├── database_id + PropertyNames → Notion query
//!               ├── backlink → payload extras
//!               ├── gotify   → dispatch target (optional)
//!               └── RunMode  → Immediate | Scheduled { CronSchedule }
//! ```

pub mod config;
pub mod cron;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{Config, ConfigError, GotifySettings, NotionSettings, PollConfig, PropertyNames, RunMode, Settings};
pub use cron::CronSchedule;
pub use error::{DuebellError, Result};
pub use traits::{NotificationSink, TaskSource};
pub use types::{DispatchFailure, DispatchOutcome, NotificationExtras, NotificationPayload, Task};
