//! Scheduled post lookup from a CSV data file
//!
//! The file is re-read on every call. Dates are matched as raw strings against
//! today's date rendered as unpadded `month/day/year` (e.g. `3/7/2025`); a
//! file that stores dates any other way will simply never match.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::{Config, SourceConfig};
use crate::error::{Result, SourceError};

/// One row of the data file, selected by its date
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPost {
    /// The date string the row is filed under
    pub date: String,
    /// Main text content, `None` when the cell is empty
    pub content: Option<String>,
    /// Cloud-storage share link for the media, `None` when the cell is empty
    pub media_link: Option<String>,
    /// Every column of the row keyed by header name
    pub fields: HashMap<String, String>,
}

/// Render a date the way the data file stores it: `M/D/YYYY`, no padding
pub fn date_key(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct CsvSource {
    path: PathBuf,
    columns: SourceConfig,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, columns: SourceConfig) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source_path(), config.source.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The post filed under `date`, or `None` if there is none or the file is unreadable
    pub fn post_for(&self, date: NaiveDate) -> Option<ScheduledPost> {
        let key = date_key(date);
        info!(date = %key, "Looking up scheduled post");

        match self.find(&key) {
            Ok(post) => post,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Error reading data file");
                None
            }
        }
    }

    /// Scan the file for the first row whose date column equals `key`
    pub fn find(&self, key: &str) -> Result<Option<ScheduledPost>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(SourceError::Csv)?;

        let headers = reader.headers().map_err(SourceError::Csv)?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h == self.columns.date_column)
            .ok_or_else(|| SourceError::MissingColumn(self.columns.date_column.clone()))?;

        for record in reader.records() {
            let record = record.map_err(SourceError::Csv)?;
            if record.get(date_idx) != Some(key) {
                continue;
            }

            let fields: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();
            debug!(?fields, "Matched row");

            let cell = |column: &str| {
                fields
                    .get(column)
                    .filter(|v| !v.trim().is_empty())
                    .cloned()
            };

            return Ok(Some(ScheduledPost {
                date: key.to_string(),
                content: cell(&self.columns.content_column),
                media_link: cell(&self.columns.media_column),
                fields,
            }));
        }

        debug!(date = %key, "No row matched");
        Ok(None)
    }
}
