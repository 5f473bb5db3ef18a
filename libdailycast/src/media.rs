//! Media download from cloud-storage share links
//!
//! A share link such as `https://drive.google.com/file/d/<id>/view` is turned
//! into a direct download request. Large files answer the first request with a
//! `download_warning*` cookie instead of the content; the request is then
//! repeated once with `confirm=<cookie value>`.

use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{MediaError, Result};

const CHUNK_SIZE: usize = 32 * 1024;
const DEFAULT_SUFFIX: &str = ".tmp";
const CONFIRM_COOKIE_PREFIX: &str = "download_warning";

fn file_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("file id pattern is valid"))
}

fn disposition_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"filename\*?=([^;]+)").expect("disposition pattern is valid"))
}

/// Extract the file identifier from a share link
pub fn extract_file_id(share_link: &str) -> Option<&str> {
    file_id_pattern()
        .captures(share_link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// File suffix (with leading dot) taken from a `Content-Disposition` value
pub fn suffix_from_disposition(header: &str) -> Option<String> {
    let caps = disposition_pattern().captures(header)?;
    let filename = caps[1].trim().trim_matches('"');
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}

/// Delete a downloaded file; failures are logged and otherwise ignored
pub fn cleanup(path: &Path) {
    if !path.exists() {
        debug!(path = %path.display(), "Nothing to clean up");
        return;
    }

    match std::fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "Cleaned up temporary file"),
        Err(e) => warn!(path = %path.display(), error = %e, "Error during cleanup"),
    }
}

/// A downloaded media file owned by the current run
///
/// The file is removed when the asset is dropped, including during unwinding.
#[derive(Debug)]
pub struct MediaAsset {
    path: PathBuf,
}

impl MediaAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now
    pub fn cleanup(self) {
        drop(self);
    }
}

impl Drop for MediaAsset {
    fn drop(&mut self) {
        cleanup(&self.path);
    }
}

pub struct MediaFetcher {
    client: Client,
    download_url: String,
}

impl MediaFetcher {
    /// `download_url` is the provider's direct download endpoint
    pub fn new(download_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(MediaError::Http)?;

        Ok(Self {
            client,
            download_url: download_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoints.drive_download.clone())
    }

    /// Download the file behind `share_link` into a new temporary file
    ///
    /// Returns `None` (after logging why) on an empty link, a link without a
    /// file identifier, or any network or filesystem failure.
    pub async fn download(&self, share_link: &str) -> Option<MediaAsset> {
        match self.try_download(share_link).await {
            Ok(asset) => {
                info!(path = %asset.path().display(), "Media downloaded");
                Some(asset)
            }
            Err(e) => {
                error!(link = share_link, error = %e, "Failed to download media");
                None
            }
        }
    }

    pub async fn try_download(&self, share_link: &str) -> Result<MediaAsset> {
        if share_link.trim().is_empty() {
            return Err(MediaError::InvalidLink.into());
        }

        let file_id = extract_file_id(share_link)
            .ok_or_else(|| MediaError::MissingFileId(share_link.to_string()))?;

        let mut response = self.request(file_id, None).await?;
        if let Some(token) = confirm_token(&response) {
            debug!(file_id, "Download needs confirmation, retrying with token");
            response = self.request(file_id, Some(&token)).await?;
        }
        let response = response.error_for_status().map_err(MediaError::Http)?;

        let suffix = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(suffix_from_disposition)
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());

        let path = write_body(response, &suffix).await?;
        Ok(MediaAsset::new(path))
    }

    async fn request(
        &self,
        file_id: &str,
        confirm: Option<&str>,
    ) -> std::result::Result<Response, MediaError> {
        let mut params = vec![("export", "download"), ("id", file_id)];
        if let Some(token) = confirm {
            params.push(("confirm", token));
        }

        let response = self
            .client
            .get(&self.download_url)
            .query(&params)
            .send()
            .await?;
        Ok(response)
    }
}

fn confirm_token(response: &Response) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name().starts_with(CONFIRM_COOKIE_PREFIX))
        .map(|cookie| cookie.value().to_string())
}

/// Stream the response body into a kept temporary file
///
/// The file is removed again if anything fails before it is kept.
async fn write_body(
    mut response: Response,
    suffix: &str,
) -> std::result::Result<PathBuf, MediaError> {
    let temp = tempfile::Builder::new()
        .prefix("dailycast-")
        .suffix(suffix)
        .tempfile()?;

    let file = tokio::fs::File::from_std(temp.reopen()?);
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    while let Some(chunk) = response.chunk().await? {
        writer.write_all(&chunk).await?;
    }
    writer.flush().await?;
    drop(writer);

    let (_, path) = temp.keep().map_err(|e| MediaError::Io(e.error))?;
    Ok(path)
}
