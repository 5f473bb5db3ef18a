//! Dailycast - scheduled cross-posting from a spreadsheet
//!
//! This library reads the post scheduled for a given day from a CSV file,
//! downloads its media from a cloud-storage share link, shortens the text
//! where a platform needs it, and publishes the result to each enabled
//! social platform.

pub mod adapter;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod platforms;
pub mod source;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use adapter::{ContentAdapter, GeminiSummarizer, Summarizer};
pub use config::{Config, Credentials};
pub use error::{DailycastError, Result};
pub use media::{MediaAsset, MediaFetcher};
pub use platforms::Platform;
pub use source::{CsvSource, ScheduledPost};
pub use types::PlatformKind;
pub use workflow::{DailyWorkflow, PostResult, RunOutcome};
