//! # duebell-notify
//!
//! Turns tasks into Gotify notifications and delivers them.
//!
//! ```text
//! Task ── NotificationFormatter ──► NotificationPayload ── GotifyDispatcher ──► POST {url}/message?token=…
//!          "today" → 👍 / 5                                  no url → Skipped
//!          else    → 💀 / 6                                  error  → Failed(detail), never propagated
//! ```

pub mod dispatch;
pub mod format;

pub use dispatch::GotifyDispatcher;
pub use format::{FormatError, NotificationFormatter, Urgency};
