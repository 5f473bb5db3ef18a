//! Facebook Page photo posting via the Graph API
//!
//! A single multipart request uploads the image and publishes it with a caption.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::platforms::{map_status_error, map_transport_error, read_media, Platform};

const NAME: &str = "facebook";

pub struct FacebookClient {
    client: Client,
    graph_url: String,
    page_id: Option<String>,
    access_token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct PhotoResponse {
    id: String,
    post_id: Option<String>,
}

impl FacebookClient {
    /// `graph_url` is the versioned Graph API base, e.g. `https://graph.facebook.com/v18.0`
    pub fn new(
        graph_url: impl Into<String>,
        page_id: Option<String>,
        access_token: Option<SecretString>,
    ) -> Self {
        Self {
            client: Client::new(),
            graph_url: graph_url.into(),
            page_id,
            access_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let creds = &config.credentials.facebook;
        Self::new(
            config.endpoints.facebook_graph.clone(),
            creds.page_id.clone(),
            creds
                .access_token
                .as_ref()
                .map(|t| SecretString::from(t.expose_secret().to_string())),
        )
    }
}

/// Log the Graph API error payload, pretty-printed when it is JSON
fn log_error_detail(body: &str) {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string());
            error!(details = %pretty, "Facebook error details");
        }
        Err(_) => {
            error!(body = %body, "Could not decode JSON from Facebook's error response");
        }
    }
}

#[async_trait]
impl Platform for FacebookClient {
    fn name(&self) -> &str {
        NAME
    }

    fn is_configured(&self) -> bool {
        self.page_id.is_some() && self.access_token.is_some()
    }

    async fn publish(&self, text: &str, media: &Path) -> Result<String> {
        let (Some(page_id), Some(token)) = (&self.page_id, &self.access_token) else {
            return Err(PlatformError::NotConfigured(NAME.to_string()).into());
        };

        let (file_name, bytes) = read_media(media).await?;
        let form = Form::new().part("source", Part::bytes(bytes).file_name(file_name));

        info!("Uploading media and posting to Facebook");
        let url = format!("{}/{}/photos", self.graph_url, page_id);
        let response = self
            .client
            .post(&url)
            .query(&[("caption", text), ("access_token", token.expose_secret())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_transport_error(NAME, "photo upload", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_error_detail(&body);
            return Err(map_status_error(NAME, "photo upload", status, &body).into());
        }

        let photo: PhotoResponse = response.json().await.map_err(|e| {
            PlatformError::Posting(format!("Unexpected Facebook response: {}", e))
        })?;

        Ok(photo.post_id.unwrap_or(photo.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn media_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"PNG fake image bytes").unwrap();
        file
    }

    fn client(server: &MockServer) -> FacebookClient {
        FacebookClient::new(
            server.uri(),
            Some("12345".to_string()),
            Some(SecretString::from("page-token")),
        )
    }

    #[tokio::test]
    async fn test_post_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/12345/photos"))
            .and(query_param("caption", "Hello, Facebook!"))
            .and(query_param("access_token", "page-token"))
            .and(body_string_contains("name=\"source\""))
            .and(body_string_contains("fake image bytes"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "777", "post_id": "12345_777"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let media = media_file();
        let client = client(&server);

        assert_eq!(
            client.publish("Hello, Facebook!", media.path()).await.unwrap(),
            "12345_777"
        );
    }

    #[tokio::test]
    async fn test_post_api_error_returns_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/12345/photos"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Invalid OAuth access token.", "code": 190}
            })))
            .mount(&server)
            .await;

        let media = media_file();
        let client = client(&server);

        match client.publish("caption", media.path()).await {
            Err(crate::DailycastError::Platform(PlatformError::Validation(msg))) => {
                assert!(msg.contains("Invalid OAuth access token."));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(!client.post("caption", media.path()).await);
    }

    #[tokio::test]
    async fn test_post_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let media = media_file();
        let result = client(&server).publish("caption", media.path()).await;
        assert!(matches!(
            result,
            Err(crate::DailycastError::Platform(PlatformError::Network(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let media = media_file();
        let client = FacebookClient::new(server.uri(), Some("12345".to_string()), None);

        assert!(!client.is_configured());
        assert!(!client.post("caption", media.path()).await);
        assert!(matches!(
            client.publish("caption", media.path()).await,
            Err(crate::DailycastError::Platform(PlatformError::NotConfigured(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_media_file() {
        let server = MockServer::start().await;
        let result = client(&server)
            .publish("caption", Path::new("/nonexistent/photo.png"))
            .await;
        assert!(matches!(
            result,
            Err(crate::DailycastError::Platform(PlatformError::Io(_)))
        ));
    }
}
