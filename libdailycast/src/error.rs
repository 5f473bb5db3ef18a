//! Error types for Dailycast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DailycastError>;

#[derive(Error, Debug)]
pub enum DailycastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DailycastError {
    /// Returns the process exit code for errors that escape to `main`
    ///
    /// Only startup failures reach this point; workflow failures are logged
    /// and the run still exits normally.
    pub fn exit_code(&self) -> i32 {
        match self {
            DailycastError::Config(_) | DailycastError::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found in header")]
    MissingColumn(String),
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid or missing share link")]
    InvalidLink,

    #[error("Could not parse file ID from URL: {0}")]
    MissingFileId(String),

    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to write media file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone)]
pub enum SummarizeError {
    #[error("Summarization API key not configured")]
    MissingApiKey,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Unauthorized: API key is invalid")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Provider error ({0}): {1}")]
    Provider(u16, String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Media file error: {0}")]
    Io(String),
}
