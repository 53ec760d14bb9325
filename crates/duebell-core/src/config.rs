//! duebell configuration system.
//!
//! Flags, environment variables and `.env` are collected into [`Settings`]
//! by the binary. [`Config::from_settings`] validates them once at startup
//! and everything downstream receives the resulting immutable [`Config`].

use std::fmt;

use chrono::Local;
use thiserror::Error;

use crate::cron::CronSchedule;
use crate::error::DuebellError;

/// Fires at the top of every 3rd hour from 08:00 to 21:00, every day.
pub const DEFAULT_CRON_EXPRESSION: &str = "0 8-21/3 * * *";
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_STATUS_PROPERTY: &str = "Status";
pub const DEFAULT_TITLE_PROPERTY: &str = "Task";

/// Raw settings before validation. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub notion_token: Option<String>,
    pub database_id: Option<String>,
    pub backlink: Option<String>,
    pub gotify_url: Option<String>,
    pub gotify_token: Option<String>,
    pub list_databases: bool,
    pub no_cron: bool,
    pub cron_expression: Option<String>,
    pub status_property: Option<String>,
    pub title_property: Option<String>,
    pub notion_api_url: Option<String>,
}

/// Validated configuration — what the process will do.
#[derive(Debug, Clone)]
pub enum Config {
    /// Print every database visible to the token, then exit.
    ListDatabases { notion: NotionSettings },
    /// Poll one database for due/overdue tasks.
    Poll(PollConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionSettings {
    pub token: String,
    pub api_url: String,
}

/// Names of the database properties the query and normalizer read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    /// Formula property whose text says "Due today" / "N days overdue".
    pub status: String,
    /// Title property of each row.
    pub title: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS_PROPERTY.into(),
            title: DEFAULT_TITLE_PROPERTY.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotifySettings {
    pub url: String,
    pub token: String,
}

/// How the poll pipeline is driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Run once and exit.
    Immediate,
    /// Run on every tick of the schedule for the life of the process.
    Scheduled { schedule: CronSchedule },
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub notion: NotionSettings,
    pub database_id: String,
    pub properties: PropertyNames,
    pub backlink: Option<String>,
    pub gotify: Option<GotifySettings>,
    pub run_mode: RunMode,
}

/// A required setting that was not provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingSetting {
    pub name: &'static str,
    pub flag: &'static str,
    pub env: &'static str,
    pub placeholder: &'static str,
    pub hint: Option<&'static str>,
}

pub const NOTION_TOKEN: MissingSetting = MissingSetting {
    name: "Notion API token",
    flag: "token",
    env: "NOTION_TOKEN",
    placeholder: "your_token",
    hint: None,
};

pub const NOTION_DB: MissingSetting = MissingSetting {
    name: "Notion Database ID",
    flag: "db",
    env: "NOTION_DB",
    placeholder: "your_db_id",
    hint: Some("Hint: list known/shared databases with the --list=true option"),
};

pub const GOTIFY_TOKEN: MissingSetting = MissingSetting {
    name: "Gotify token",
    flag: "gotify-token",
    env: "GOTIFY_TOKEN",
    placeholder: "your_gotify_token",
    hint: None,
};

impl fmt::Display for MissingSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} not found.", self.name)?;
        writeln!(f, "  Either pass it as a CLI argument: --{}={}", self.flag, self.placeholder)?;
        write!(f, "  Or add it to .env as {}={}", self.env, self.placeholder)?;
        if let Some(hint) = self.hint {
            write!(f, "\n  {hint}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}", render_missing(.0))]
    Missing(Vec<MissingSetting>),

    #[error(
        "{0}\n  Pass a 5-field expression such as --cron-string=\"{default}\" or set CRON_STRING",
        default = DEFAULT_CRON_EXPRESSION
    )]
    InvalidCron(#[source] DuebellError),
}

fn render_missing(missing: &[MissingSetting]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Validate raw settings. Every missing required setting is reported at once.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let token = present(settings.notion_token);
        let database_id = present(settings.database_id);
        let gotify_url = present(settings.gotify_url);
        let gotify_token = present(settings.gotify_token);

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push(NOTION_TOKEN);
        }
        if !settings.list_databases && database_id.is_none() {
            missing.push(NOTION_DB);
        }
        if !settings.list_databases && gotify_url.is_some() && gotify_token.is_none() {
            missing.push(GOTIFY_TOKEN);
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let notion = NotionSettings {
            token: token.unwrap_or_default(),
            api_url: present(settings.notion_api_url)
                .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string()),
        };

        if settings.list_databases {
            return Ok(Self::ListDatabases { notion });
        }

        let gotify = match (gotify_url, gotify_token) {
            (Some(url), Some(token)) => Some(GotifySettings { url, token }),
            _ => None,
        };

        let run_mode = if settings.no_cron || gotify.is_none() {
            RunMode::Immediate
        } else {
            let expression = present(settings.cron_expression)
                .unwrap_or_else(|| DEFAULT_CRON_EXPRESSION.to_string());
            let schedule = CronSchedule::parse(&expression).map_err(ConfigError::InvalidCron)?;
            if schedule.next_after(&Local::now()).is_none() {
                return Err(ConfigError::InvalidCron(DuebellError::Cron(format!(
                    "'{expression}' never fires"
                ))));
            }
            RunMode::Scheduled { schedule }
        };

        Ok(Self::Poll(PollConfig {
            notion,
            database_id: database_id.unwrap_or_default(),
            properties: PropertyNames {
                status: present(settings.status_property)
                    .unwrap_or_else(|| DEFAULT_STATUS_PROPERTY.to_string()),
                title: present(settings.title_property)
                    .unwrap_or_else(|| DEFAULT_TITLE_PROPERTY.to_string()),
            },
            backlink: present(settings.backlink),
            gotify,
            run_mode,
        }))
    }
}
