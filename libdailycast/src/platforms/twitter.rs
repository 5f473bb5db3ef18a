//! Twitter/X posting: v1.1 media upload followed by a v2 tweet
//!
//! Both calls are signed with OAuth 1.0a user context. The client keeps one
//! HTTP session for the upload host and one for the API host. If the four
//! credentials are incomplete, or a session cannot be built, the client is
//! marked unusable and never touches the network.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{Config, TwitterCredentials};
use crate::error::{PlatformError, Result};
use crate::platforms::oauth::OAuth1Signer;
use crate::platforms::{check_response, map_transport_error, read_media, Platform};

const NAME: &str = "twitter";

struct TwitterSession {
    upload_client: Client,
    api_client: Client,
    signer: OAuth1Signer,
}

impl TwitterSession {
    fn new(signer: OAuth1Signer) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            upload_client: Client::builder().build()?,
            api_client: Client::builder().build()?,
            signer,
        })
    }
}

pub struct TwitterClient {
    session: Option<TwitterSession>,
    upload_url: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

/// Build a signer only when all four credentials are present
fn signer_from(creds: &TwitterCredentials) -> Option<OAuth1Signer> {
    let copy = |s: &SecretString| SecretString::from(s.expose_secret().to_string());
    match (
        &creds.api_key,
        &creds.api_secret,
        &creds.access_token,
        &creds.access_token_secret,
    ) {
        (Some(key), Some(secret), Some(token), Some(token_secret)) => Some(OAuth1Signer::new(
            copy(key),
            copy(secret),
            copy(token),
            copy(token_secret),
        )),
        _ => None,
    }
}

impl TwitterClient {
    /// `upload_url` and `api_url` are host roots, e.g. `https://upload.twitter.com`
    pub fn new(
        upload_url: impl Into<String>,
        api_url: impl Into<String>,
        signer: Option<OAuth1Signer>,
    ) -> Self {
        let session = match signer {
            Some(signer) => match TwitterSession::new(signer) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "Error initializing Twitter client");
                    None
                }
            },
            None => None,
        };

        Self {
            session,
            upload_url: upload_url.into(),
            api_url: api_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.endpoints.twitter_upload.clone(),
            config.endpoints.twitter_api.clone(),
            signer_from(&config.credentials.twitter),
        )
    }

    async fn upload_media(&self, session: &TwitterSession, media: &Path) -> Result<String> {
        info!("Uploading media to Twitter");
        let (file_name, bytes) = read_media(media).await?;
        let form = Form::new().part("media", Part::bytes(bytes).file_name(file_name));

        let url = format!("{}/1.1/media/upload.json", self.upload_url);
        let auth = session.signer.authorization_header("POST", &url, &[]);
        let response = session
            .upload_client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_transport_error(NAME, "media upload", e))?;
        let response = check_response(NAME, "media upload", response).await?;

        let uploaded: MediaUploadResponse = response.json().await.map_err(|e| {
            PlatformError::Posting(format!("Unexpected media upload response: {}", e))
        })?;
        Ok(uploaded.media_id_string)
    }

    async fn create_tweet(
        &self,
        session: &TwitterSession,
        text: &str,
        media_id: &str,
    ) -> Result<String> {
        info!("Posting tweet");
        let url = format!("{}/2/tweets", self.api_url);
        let auth = session.signer.authorization_header("POST", &url, &[]);
        let response = session
            .api_client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&json!({
                "text": text,
                "media": {"media_ids": [media_id]}
            }))
            .send()
            .await
            .map_err(|e| map_transport_error(NAME, "create tweet", e))?;
        let response = check_response(NAME, "create tweet", response).await?;

        let created: CreateTweetResponse = response.json().await.map_err(|e| {
            PlatformError::Posting(format!("Unexpected create tweet response: {}", e))
        })?;
        Ok(created.data.id)
    }
}

#[async_trait]
impl Platform for TwitterClient {
    fn name(&self) -> &str {
        NAME
    }

    fn is_configured(&self) -> bool {
        self.session.is_some()
    }

    async fn publish(&self, text: &str, media: &Path) -> Result<String> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| PlatformError::NotConfigured(NAME.to_string()))?;

        let media_id = self.upload_media(session, media).await?;
        self.create_tweet(session, text, &media_id).await
    }
}
