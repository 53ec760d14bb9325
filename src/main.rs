//! # duebell
//!
//! Polls a Notion database for tasks that are due today or overdue and
//! pushes a Gotify notification for each of them.
//!
//! Usage:
//!   duebell --token=secret_… --db=…                                   # print due tasks once
//!   duebell --token=… --db=… --gotify-url=… --gotify-token=…           # notify on the cron schedule
//!   duebell --token=… --db=… --gotify-url=… --gotify-token=… --no-cron # notify once (testing)
//!   duebell --token=… --list                                           # list shared databases
//!
//! Every option can also come from the environment or a `.env` file.

use anyhow::Result;
use clap::{ArgAction, Parser};
use duebell_core::{Config, NotionSettings, PollConfig, RunMode, Settings};
use duebell_notion::NotionClient;
use duebell_scheduler::{Pipeline, RunScheduler};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "duebell",
    version,
    about = "🔔 duebell — Gotify notifications for Notion tasks due today or overdue"
)]
struct Cli {
    /// Notion API token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Notion database ID (see --list)
    #[arg(long, env = "NOTION_DB")]
    db: Option<String>,

    /// Notion URL opened when a notification is tapped
    #[arg(long = "notion-backlink", env = "NOTION_BACKLINK")]
    notion_backlink: Option<String>,

    /// Gotify server URL; without it tasks are only printed
    #[arg(long = "gotify-url", env = "GOTIFY_URL")]
    gotify_url: Option<String>,

    /// Gotify application token (required with --gotify-url)
    #[arg(long = "gotify-token", env = "GOTIFY_TOKEN", hide_env_values = true)]
    gotify_token: Option<String>,

    /// List databases shared with the integration and exit
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true", default_value_t = false)]
    list: bool,

    /// Run once instead of on the cron schedule
    #[arg(long = "no-cron", action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true", default_value_t = false)]
    no_cron: bool,

    /// Cron expression (MIN HOUR DOM MON DOW) [default: "0 8-21/3 * * *"]
    #[arg(long = "cron-string", env = "CRON_STRING")]
    cron_string: Option<String>,

    /// Name of the formula property holding the due status [default: Status]
    #[arg(long = "status-property", env = "NOTION_STATUS_PROPERTY")]
    status_property: Option<String>,

    /// Name of the title property [default: Task]
    #[arg(long = "title-property", env = "NOTION_TITLE_PROPERTY")]
    title_property: Option<String>,

    /// Notion API base URL
    #[arg(long = "notion-api-url", env = "NOTION_API_URL")]
    notion_api_url: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_settings(self) -> Settings {
        Settings {
            notion_token: self.token,
            database_id: self.db,
            backlink: self.notion_backlink,
            gotify_url: self.gotify_url,
            gotify_token: self.gotify_token,
            list_databases: self.list,
            no_cron: self.no_cron,
            cron_expression: self.cron_string,
            status_property: self.status_property,
            title_property: self.title_property,
            notion_api_url: self.notion_api_url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Real environment variables win over .env entries.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "duebell=debug" } else { "duebell=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match Config::from_settings(cli.into_settings()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n{e}\n");
            std::process::exit(1);
        }
    };

    match config {
        Config::ListDatabases { notion } => list_databases(&notion).await,
        Config::Poll(poll) => poll_tasks(poll).await,
    }
}

/// Print every database shared with the token as `{ id, title }`.
async fn list_databases(notion: &NotionSettings) -> Result<()> {
    tracing::info!("Listing databases...");
    let databases = NotionClient::new(notion).list_databases().await?;
    for db in &databases {
        println!("\n{{");
        println!("  id: {}", db.id);
        println!("  title: {}", db.title);
        println!("}}");
    }
    Ok(())
}

async fn poll_tasks(poll: PollConfig) -> Result<()> {
    if poll.gotify.is_none() {
        tracing::info!("No Gotify URL configured; continuing without gotify/cron...");
    }
    tracing::info!("Initialising Notion client...");

    let immediate = matches!(poll.run_mode, RunMode::Immediate);
    let pipeline = Pipeline::from_config(&poll).with_console_output(immediate);
    let scheduler = RunScheduler::new(pipeline, poll.run_mode);

    if let Some(report) = scheduler.start().await? {
        tracing::debug!("Immediate run complete: {:?}", report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("duebell").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_bool_flags_bare_and_explicit() {
        let cli = parse(&[]);
        assert!(!cli.list);
        assert!(!cli.no_cron);

        let cli = parse(&["--list", "--no-cron"]);
        assert!(cli.list);
        assert!(cli.no_cron);

        let cli = parse(&["--list=true", "--no-cron=true"]);
        assert!(cli.list);
        assert!(cli.no_cron);

        let cli = parse(&["--list=false", "--no-cron=false"]);
        assert!(!cli.list);
        assert!(!cli.no_cron);
    }

    #[test]
    fn test_invalid_bool_value_rejected() {
        assert!(Cli::try_parse_from(["duebell", "--list=maybe"]).is_err());
    }

    #[test]
    fn test_flags_map_into_settings() {
        let settings = parse(&[
            "--token=secret_abc",
            "--db=db-1",
            "--notion-backlink=https://notion.so/chores",
            "--gotify-url=https://push.example.com",
            "--gotify-token=AbC123",
            "--no-cron",
            "--cron-string=*/5 * * * *",
            "--status-property=Due",
            "--title-property=Name",
            "--notion-api-url=http://localhost:8080",
        ])
        .into_settings();

        assert_eq!(settings.notion_token.as_deref(), Some("secret_abc"));
        assert_eq!(settings.database_id.as_deref(), Some("db-1"));
        assert_eq!(settings.backlink.as_deref(), Some("https://notion.so/chores"));
        assert_eq!(settings.gotify_url.as_deref(), Some("https://push.example.com"));
        assert_eq!(settings.gotify_token.as_deref(), Some("AbC123"));
        assert!(!settings.list_databases);
        assert!(settings.no_cron);
        assert_eq!(settings.cron_expression.as_deref(), Some("*/5 * * * *"));
        assert_eq!(settings.status_property.as_deref(), Some("Due"));
        assert_eq!(settings.title_property.as_deref(), Some("Name"));
        assert_eq!(settings.notion_api_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_flag_beats_env_and_env_fills_gaps() {
        // Only this test touches these variables.
        unsafe {
            std::env::set_var("NOTION_STATUS_PROPERTY", "FromEnv");
            std::env::set_var("NOTION_TITLE_PROPERTY", "EnvTitle");
        }

        let settings = parse(&["--status-property=FromFlag"]).into_settings();
        assert_eq!(settings.status_property.as_deref(), Some("FromFlag"));
        assert_eq!(settings.title_property.as_deref(), Some("EnvTitle"));

        unsafe {
            std::env::remove_var("NOTION_STATUS_PROPERTY");
            std::env::remove_var("NOTION_TITLE_PROPERTY");
        }
    }
}
