//! daily-post - Publish today's scheduled post to every enabled platform

use chrono::NaiveDate;
use clap::Parser;
use libdailycast::logging::{self, LogFormat, LoggingConfig};
use libdailycast::{
    Config, Credentials, DailyWorkflow, DailycastError, PlatformKind, Result, RunOutcome,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "daily-post")]
#[command(version)]
#[command(about = "Publish today's scheduled post to every enabled platform")]
#[command(long_about = "\
daily-post - Publish today's scheduled post to every enabled platform

DESCRIPTION:
    Looks up the row for today in the data file, downloads its media from
    the share link, and posts it to each enabled platform. Platforms listed
    under [platforms].adapt get text shortened to the character limit.
    Meant to be run once a day from cron.

USAGE:
    daily-post
    daily-post --data ~/posts.csv --platform facebook,linkedin
    daily-post --date 2025-03-07 --verbose

CONFIGURATION:
    Settings file: ~/.config/dailycast/config.toml (or DAILYCAST_CONFIG)
    Credentials are read from the environment or a local .env file:
    GEMINI_API_KEY, TWITTER_API_KEY, TWITTER_API_SECRET,
    TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_TOKEN_SECRET, FACEBOOK_PAGE_ID,
    FACEBOOK_ACCESS_TOKEN, LINKEDIN_ACCESS_TOKEN, LINKEDIN_USER_ID

EXIT CODES:
    0 - Run finished (including days with nothing to post)
    2 - Invalid settings or arguments
")]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Data file (overrides [source].path)
    #[arg(short, long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Post the row for this day instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Platforms to post to, comma-separated (overrides [platforms].enabled)
    #[arg(short, long)]
    platform: Option<String>,

    /// Log output format: text, json or pretty
    #[arg(long, env = "DAILYCAST_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, logging::level_from_env(), cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_path(path)?;
            config.credentials = Credentials::from_env();
            config
        }
        None => Config::load()?,
    };

    if let Some(data) = &cli.data {
        config.source.path = data.to_string_lossy().to_string();
    }
    if let Some(platforms) = &cli.platform {
        config.platforms.enabled =
            PlatformKind::parse_list(platforms).map_err(DailycastError::InvalidInput)?;
    }

    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let workflow = DailyWorkflow::from_config(&config)?;

    info!(data = %config.source_path().display(), "daily-post starting");
    let outcome = match cli.date {
        Some(date) => workflow.run(date).await,
        None => workflow.run_today().await,
    };

    match outcome {
        RunOutcome::NoPostToday { date } => {
            println!("No post scheduled for {}", date);
        }
        RunOutcome::NoContent { date } => {
            println!("Post for {} has no text, nothing posted", date);
        }
        RunOutcome::MediaUnavailable { date } => {
            println!("Media unavailable for {}, nothing posted", date);
        }
        RunOutcome::Completed { results, .. } => {
            for result in results {
                let status = if result.success { "ok" } else { "failed" };
                println!("{}: {}", result.platform, status);
            }
        }
    }

    Ok(())
}
