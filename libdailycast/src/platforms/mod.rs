//! Platform abstraction and implementations
//!
//! Every platform exposes the same capability: publish a caption together
//! with one media file. Implementations do their platform-specific call
//! sequence in [`Platform::publish`] and report typed errors; the provided
//! [`Platform::post`] turns that into the boolean outcome the workflow
//! records, logging whatever went wrong. One platform failing never stops
//! another from being attempted.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use libdailycast::config::Config;
//! use libdailycast::platforms::create_platforms;
//!
//! # async fn example() -> libdailycast::error::Result<()> {
//! let config = Config::load()?;
//! for platform in create_platforms(&config) {
//!     let ok = platform.post("Hello!", Path::new("/tmp/photo.jpg")).await;
//!     println!("{}: {}", platform.name(), ok);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::types::PlatformKind;

pub mod facebook;
pub mod linkedin;
pub mod oauth;
pub mod twitter;

// Available outside tests so integration tests can drive the workflow
pub mod mock;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Lowercase identifier, e.g. "facebook"
    fn name(&self) -> &str;

    /// Whether every credential the platform needs is present
    fn is_configured(&self) -> bool;

    /// Upload `media` and publish it with `text` as the caption
    ///
    /// Returns the platform's identifier for the new post.
    ///
    /// # Errors
    ///
    /// - `PlatformError::NotConfigured` when credentials are missing
    /// - `PlatformError::Io` when the media file cannot be read
    /// - `PlatformError::Authentication`, `Validation`, `RateLimit`,
    ///   `Network` or `Posting` depending on how the API responded
    async fn publish(&self, text: &str, media: &Path) -> Result<String>;

    /// Publish and report success; errors are logged, never returned
    async fn post(&self, text: &str, media: &Path) -> bool {
        if !self.is_configured() {
            warn!(platform = self.name(), "Config missing, cannot post");
            return false;
        }

        match self.publish(text, media).await {
            Ok(post_id) => {
                info!(platform = self.name(), post_id = %post_id, "Successfully posted");
                true
            }
            Err(e) => {
                error!(platform = self.name(), error = %e, "An error occurred while posting");
                false
            }
        }
    }
}

/// Build one poster per enabled platform, in configuration order
pub fn create_platforms(config: &Config) -> Vec<Box<dyn Platform>> {
    config
        .platforms
        .enabled
        .iter()
        .map(|kind| -> Box<dyn Platform> {
            match kind {
                PlatformKind::Twitter => Box::new(twitter::TwitterClient::from_config(config)),
                PlatformKind::LinkedIn => Box::new(linkedin::LinkedInClient::from_config(config)),
                PlatformKind::Facebook => Box::new(facebook::FacebookClient::from_config(config)),
            }
        })
        .collect()
}

/// Read the media file into memory for upload
pub(crate) async fn read_media(media: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(media).await.map_err(|e| {
        PlatformError::Io(format!("Failed to read {}: {}", media.display(), e))
    })?;
    let file_name = media
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("media")
        .to_string();
    Ok((file_name, bytes))
}

/// Map a transport failure (no HTTP response) to a platform error
pub(crate) fn map_transport_error(
    platform: &str,
    context: &str,
    e: reqwest::Error,
) -> PlatformError {
    PlatformError::Network(format!("{} request failed ({}): {}", platform, context, e))
}

/// Map a non-2xx HTTP response to a platform error, keeping the body
pub(crate) fn map_status_error(
    platform: &str,
    context: &str,
    status: StatusCode,
    body: &str,
) -> PlatformError {
    let detail = format!("{} {} ({}): {}", platform, status, context, body);
    match status.as_u16() {
        401 | 403 => PlatformError::Authentication(detail),
        400 | 422 => PlatformError::Validation(detail),
        429 => PlatformError::RateLimit(detail),
        500..=599 => PlatformError::Network(detail),
        _ => PlatformError::Posting(detail),
    }
}

/// Pass a successful response through, or turn a failed one into an error
pub(crate) async fn check_response(
    platform: &str,
    context: &str,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_status_error(platform, context, status, &body).into())
}
