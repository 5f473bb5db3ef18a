//! The daily run: look up today's row, fetch its media, post it everywhere
//!
//! Each step is awaited in order. A run stops early when there is no row for
//! the day, the row has no text, or the media cannot be downloaded; otherwise
//! every enabled platform is attempted independently and the downloaded file
//! is removed afterwards whatever the outcome.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::adapter::ContentAdapter;
use crate::config::Config;
use crate::error::Result;
use crate::media::MediaFetcher;
use crate::platforms::{create_platforms, Platform};
use crate::source::{date_key, today, CsvSource};
use crate::types::PlatformKind;

const PREVIEW_CHARS: usize = 50;

/// Result of posting to one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResult {
    pub platform: String,
    pub success: bool,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No row is filed under the requested date
    NoPostToday { date: String },
    /// The row has no text; nothing was downloaded or posted
    NoContent { date: String },
    /// The row's media could not be downloaded; nothing was posted
    MediaUnavailable { date: String },
    /// Every enabled platform was attempted
    Completed { date: String, results: Vec<PostResult> },
}

impl RunOutcome {
    pub fn results(&self) -> &[PostResult] {
        match self {
            RunOutcome::Completed { results, .. } => results,
            _ => &[],
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

pub struct DailyWorkflow {
    source: CsvSource,
    fetcher: MediaFetcher,
    adapter: ContentAdapter,
    platforms: Vec<Box<dyn Platform>>,
    adapt_for: Vec<PlatformKind>,
    char_limit: usize,
}

impl DailyWorkflow {
    pub fn new(
        source: CsvSource,
        fetcher: MediaFetcher,
        adapter: ContentAdapter,
        platforms: Vec<Box<dyn Platform>>,
    ) -> Self {
        Self {
            source,
            fetcher,
            adapter,
            platforms,
            adapt_for: vec![PlatformKind::Twitter],
            char_limit: 280,
        }
    }

    /// Platforms that get the adapted text instead of the original content
    pub fn with_adaptation(mut self, adapt_for: Vec<PlatformKind>, char_limit: usize) -> Self {
        self.adapt_for = adapt_for;
        self.char_limit = char_limit;
        self
    }

    /// Build the full workflow from settings and environment credentials
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            CsvSource::from_config(config),
            MediaFetcher::from_config(config)?,
            ContentAdapter::from_config(config),
            create_platforms(config),
        )
        .with_adaptation(config.platforms.adapt.clone(), config.content.char_limit))
    }

    fn wants_adaptation(&self, platform: &dyn Platform) -> bool {
        self.adapt_for
            .iter()
            .any(|kind| kind.as_str() == platform.name())
    }

    /// Run for the local calendar day
    pub async fn run_today(&self) -> RunOutcome {
        self.run(today()).await
    }

    pub async fn run(&self, date: NaiveDate) -> RunOutcome {
        let Some(post) = self.source.post_for(date) else {
            info!(date = %date, "No post scheduled for today");
            return RunOutcome::NoPostToday {
                date: date_key(date),
            };
        };

        let Some(content) = post.content.clone() else {
            warn!(date = %post.date, "Row has no content, aborting run");
            return RunOutcome::NoContent { date: post.date };
        };
        info!(date = %post.date, preview = %preview(&content), "Found post for today");
        let link = post.media_link.clone().unwrap_or_default();

        let Some(asset) = self.fetcher.download(&link).await else {
            warn!(date = %post.date, "Media download failed, aborting run");
            return RunOutcome::MediaUnavailable { date: post.date };
        };

        let mut adapted: Option<String> = None;
        let mut results = Vec::with_capacity(self.platforms.len());
        for platform in &self.platforms {
            let text = if self.wants_adaptation(platform.as_ref()) {
                if adapted.is_none() {
                    adapted = Some(self.adapter.adapt(&content, self.char_limit).await);
                }
                adapted.as_deref().unwrap_or(&content)
            } else {
                content.as_str()
            };

            let success = platform.post(text, asset.path()).await;
            info!(platform = platform.name(), success, "Post result");
            results.push(PostResult {
                platform: platform.name().to_string(),
                success,
            });
        }

        asset.cleanup();
        info!("Workflow finished");
        RunOutcome::Completed {
            date: post.date,
            results,
        }
    }
}

/// First 50 characters of `text` followed by an ellipsis, for log lines
fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
