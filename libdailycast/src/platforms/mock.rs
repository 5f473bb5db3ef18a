//! Mock platform implementation for testing
//!
//! A configurable stand-in for a real poster. It records every publish call,
//! including whether the media file existed at that moment, so tests can
//! verify ordering and cleanup without network access. Clones share their
//! recorded state, which lets a test keep a handle after boxing one clone
//! into a workflow.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "facebook", "mock-twitter")
    pub name: String,

    /// Whether posting should succeed
    pub post_succeeds: bool,

    /// Error to return on posting failure
    pub post_error: Option<String>,

    /// Whether the platform is configured
    pub is_configured: bool,

    /// Publish calls made so far
    pub calls: Arc<Mutex<Vec<MockCall>>>,
}

/// One recorded publish call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub text: String,
    pub media: PathBuf,
    pub media_existed: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            post_succeeds: true,
            post_error: None,
            is_configured: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A mock platform whose API rejects every post
    pub fn post_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_succeeds: false,
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A mock platform with missing credentials
    pub fn not_configured(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            is_configured: false,
            ..Default::default()
        })
    }

    /// Number of publish attempts that reached the platform
    pub fn post_call_count(&self) -> usize {
        self.config.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.config.calls.lock().unwrap().clone()
    }

    /// Texts passed to publish, in call order
    pub fn posted_content(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.text).collect()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured
    }

    async fn publish(&self, text: &str, media: &Path) -> Result<String> {
        self.config.calls.lock().unwrap().push(MockCall {
            text: text.to_string(),
            media: media.to_path_buf(),
            media_existed: media.exists(),
        });

        if !self.config.is_configured {
            return Err(PlatformError::NotConfigured(self.config.name.clone()).into());
        }

        if self.config.post_succeeds {
            Ok(format!("{}:mock-{}", self.config.name, self.post_call_count()))
        } else {
            let error_msg = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| "Mock posting failed".to_string());
            Err(PlatformError::Posting(error_msg).into())
        }
    }
}
