//! LinkedIn image posts through the v2 assets and UGC APIs
//!
//! Posting takes three calls: register an upload to obtain an upload URL and
//! an asset URN, PUT the image bytes to that URL, then create a public,
//! published UGC post that references the asset.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::platforms::{check_response, map_transport_error, read_media, Platform};

const NAME: &str = "linkedin";
const UPLOAD_MECHANISM: &str = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest";

pub struct LinkedInClient {
    client: Client,
    api_url: String,
    access_token: Option<SecretString>,
    user_id: Option<String>,
}

/// Upload slot handed out by `registerUpload`
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub upload_url: String,
    pub asset: String,
}

#[derive(Debug, Deserialize)]
struct RegisterUploadResponse {
    value: RegisterUploadValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUploadValue {
    asset: String,
    upload_mechanism: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UgcPostResponse {
    id: Option<String>,
}

impl LinkedInClient {
    /// `api_url` is the v2 REST base, e.g. `https://api.linkedin.com/v2`
    pub fn new(
        api_url: impl Into<String>,
        access_token: Option<SecretString>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            access_token,
            user_id,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let creds = &config.credentials.linkedin;
        Self::new(
            config.endpoints.linkedin_api.clone(),
            creds
                .access_token
                .as_ref()
                .map(|t| SecretString::from(t.expose_secret().to_string())),
            creds.user_id.clone(),
        )
    }

    fn author_urn(user_id: &str) -> String {
        format!("urn:li:person:{}", user_id)
    }

    async fn register_upload(&self, token: &str, author: &str) -> Result<UploadTarget> {
        info!("Registering LinkedIn media upload");
        let payload = json!({
            "registerUploadRequest": {
                "recipes": ["urn:li:digitalmediaRecipe:feedshare-image"],
                "owner": author,
                "serviceRelationships": [{
                    "relationshipType": "OWNER",
                    "identifier": "urn:li:userGeneratedContent"
                }]
            }
        });

        let response = self
            .client
            .post(format!("{}/assets", self.api_url))
            .query(&[("action", "registerUpload")])
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_transport_error(NAME, "register upload", e))?;
        let response = check_response(NAME, "register upload", response).await?;

        let body: RegisterUploadResponse = response.json().await.map_err(|e| {
            PlatformError::Posting(format!("Unexpected registerUpload response: {}", e))
        })?;
        parse_upload_target(body)
    }

    async fn upload(&self, token: &str, target: &UploadTarget, bytes: Vec<u8>) -> Result<()> {
        info!("Uploading media to LinkedIn");
        let response = self
            .client
            .put(&target.upload_url)
            .bearer_auth(token)
            .body(bytes)
            .send()
            .await
            .map_err(|e| map_transport_error(NAME, "upload media", e))?;
        check_response(NAME, "upload media", response).await?;
        Ok(())
    }

    async fn create_post(
        &self,
        token: &str,
        author: &str,
        text: &str,
        asset: &str,
    ) -> Result<String> {
        info!("Creating LinkedIn post");
        let payload = json!({
            "author": author,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": {"text": text},
                    "shareMediaCategory": "IMAGE",
                    "media": [{"status": "READY", "media": asset}]
                }
            },
            "visibility": {"com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"}
        });

        let response = self
            .client
            .post(format!("{}/ugcPosts", self.api_url))
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_transport_error(NAME, "create post", e))?;
        let response = check_response(NAME, "create post", response).await?;

        // The post URN is returned in a header; the body may be empty
        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_id = response
            .json::<UgcPostResponse>()
            .await
            .ok()
            .and_then(|body| body.id);

        Ok(header_id.or(body_id).unwrap_or_default())
    }
}

fn parse_upload_target(body: RegisterUploadResponse) -> Result<UploadTarget> {
    let upload_url = body
        .value
        .upload_mechanism
        .get(UPLOAD_MECHANISM)
        .and_then(|mechanism| mechanism.get("uploadUrl"))
        .and_then(|url| url.as_str())
        .ok_or_else(|| {
            PlatformError::Posting("registerUpload response has no upload URL".to_string())
        })?;

    Ok(UploadTarget {
        upload_url: upload_url.to_string(),
        asset: body.value.asset,
    })
}

#[async_trait]
impl Platform for LinkedInClient {
    fn name(&self) -> &str {
        NAME
    }

    fn is_configured(&self) -> bool {
        self.access_token.is_some() && self.user_id.is_some()
    }

    async fn publish(&self, text: &str, media: &Path) -> Result<String> {
        let (Some(token), Some(user_id)) = (&self.access_token, &self.user_id) else {
            return Err(PlatformError::NotConfigured(NAME.to_string()).into());
        };
        let token = token.expose_secret();
        let author = Self::author_urn(user_id);

        let (_, bytes) = read_media(media).await?;
        let target = self.register_upload(token, &author).await?;
        debug!(asset = %target.asset, "Upload registered");

        self.upload(token, &target, bytes).await?;
        self.create_post(token, &author, text, &target.asset).await
    }
}
