//! End-to-end workflow tests
//!
//! These tests drive a full daily run with every external service replaced
//! by a mock server:
//! - Long content is summarized, then posted with the downloaded media
//! - Days without a row never touch storage or platforms
//! - Unusable share links abort before any platform is called
//! - One platform failing does not stop the next

use anyhow::Result;
use chrono::NaiveDate;
use libdailycast::adapter::ContentAdapter;
use libdailycast::config::{Config, SourceConfig};
use libdailycast::platforms::facebook::FacebookClient;
use libdailycast::platforms::mock::MockPlatform;
use libdailycast::platforms::Platform;
use libdailycast::source::{date_key, CsvSource};
use libdailycast::{DailyWorkflow, GeminiSummarizer, MediaFetcher, PlatformKind, RunOutcome};
use secrecy::SecretString;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHARE_LINK: &str = "https://drive.google.com/file/d/1AbC-d_E2f/view?usp=sharing";
const SUMMARY: &str = "Our spring launch is here: fresh features, faster everything. Come see!";

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
}

/// Data file with a single row for `day()`
fn write_data(dir: &TempDir, content: &str, link: &str) -> Result<String> {
    let data_path = dir.path().join("acme.csv");
    let mut writer = csv::Writer::from_path(&data_path)?;
    writer.write_record(["Date", "Main Content", "Media", "Notes"])?;
    writer.write_record([date_key(day()).as_str(), content, link, "spring"])?;
    writer.flush()?;
    Ok(data_path.to_string_lossy().to_string())
}

fn config_for(server: &MockServer, data_path: String) -> Config {
    let mut config = Config::default();
    config.source.path = data_path;
    config.platforms.enabled = vec![PlatformKind::Facebook];
    config.platforms.adapt = vec![PlatformKind::Facebook];
    config.endpoints.drive_download = format!("{}/uc", server.uri());
    config.endpoints.gemini = format!("{}/v1beta/models", server.uri());
    config.endpoints.facebook_graph = format!("{}/v18.0", server.uri());
    config.credentials.gemini_api_key = Some(SecretString::from("gemini-key"));
    config.credentials.facebook.page_id = Some("12345".to_string());
    config.credentials.facebook.access_token = Some(SecretString::from("page-token"));
    config
}

async fn mount_download(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("id", "1AbC-d_E2f"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", r#"attachment; filename="spring.jpg""#)
                .set_body_bytes(b"jpeg bytes".to_vec()),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_gemini(server: &MockServer, summary: &str) {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", "gemini-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": summary}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_long_content_is_adapted_and_posted_with_media() -> Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let content = "Spring launch news! ".repeat(15);
    assert_eq!(content.chars().count(), 300);

    mount_download(&server).await;
    mount_gemini(&server, SUMMARY).await;
    Mock::given(method("POST"))
        .and(path("/v18.0/12345/photos"))
        .and(query_param("caption", SUMMARY))
        .and(query_param("access_token", "page-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "777", "post_id": "12345_777"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, write_data(&dir, &content, SHARE_LINK)?);
    let recorder = MockPlatform::success("archive");

    let workflow = DailyWorkflow::new(
        CsvSource::from_config(&config),
        MediaFetcher::from_config(&config)?,
        ContentAdapter::new(Box::new(GeminiSummarizer::from_config(&config))),
        vec![
            Box::new(FacebookClient::from_config(&config)),
            Box::new(recorder.clone()),
        ],
    )
    .with_adaptation(vec![PlatformKind::Facebook], 280);

    let outcome = workflow.run(day()).await;
    let results = outcome.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].platform, "facebook");
    assert!(results[0].success);

    // Platforms not listed for adaptation get the original text
    let calls = recorder.calls();
    assert_eq!(calls[0].text, content);
    assert!(calls[0].media_existed);
    assert!(calls[0].media.to_string_lossy().ends_with(".jpg"));
    assert!(!calls[0].media.exists(), "downloaded media should be removed");
    Ok(())
}

#[tokio::test]
async fn test_workflow_from_config_posts_to_facebook() -> Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let content = "x".repeat(300);
    let rambling_summary = "y".repeat(400);

    mount_download(&server).await;
    mount_gemini(&server, &rambling_summary).await;
    let expected_caption = format!("{}...", "y".repeat(277));
    Mock::given(method("POST"))
        .and(path("/v18.0/12345/photos"))
        .and(query_param("caption", expected_caption.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "778"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, write_data(&dir, &content, SHARE_LINK)?);
    let outcome = DailyWorkflow::from_config(&config)?.run(day()).await;

    match outcome {
        RunOutcome::Completed { date, results } => {
            assert_eq!(date, "3/7/2025");
            assert_eq!(results.len(), 1);
            assert!(results[0].success);
        }
        other => panic!("Expected completed run, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_no_row_today_calls_nothing() -> Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, write_data(&dir, "Hello", SHARE_LINK)?);
    let platform = MockPlatform::success("facebook");
    let workflow = DailyWorkflow::new(
        CsvSource::new(config.source_path(), SourceConfig::default()),
        MediaFetcher::from_config(&config)?,
        ContentAdapter::from_config(&config),
        vec![Box::new(platform.clone())],
    );

    let outcome = workflow.run(day().succ_opt().unwrap()).await;

    assert_eq!(
        outcome,
        RunOutcome::NoPostToday {
            date: "3/8/2025".to_string()
        }
    );
    assert_eq!(platform.post_call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unparseable_link_aborts_before_posting() -> Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(
        &server,
        write_data(&dir, "Hello", "https://drive.google.com/open?usp=sharing")?,
    );
    let platform = MockPlatform::success("facebook");
    let workflow = DailyWorkflow::new(
        CsvSource::from_config(&config),
        MediaFetcher::from_config(&config)?,
        ContentAdapter::from_config(&config),
        vec![Box::new(platform.clone())],
    );

    let outcome = workflow.run(day()).await;

    assert!(matches!(outcome, RunOutcome::MediaUnavailable { .. }));
    assert_eq!(platform.post_call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_platform_failure_is_isolated_and_cleanup_runs() -> Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    mount_download(&server).await;

    let config = config_for(&server, write_data(&dir, "Short and sweet", SHARE_LINK)?);
    let failing = MockPlatform::post_failure("linkedin", "upload rejected");
    let unconfigured = MockPlatform::not_configured("twitter");
    let healthy = MockPlatform::success("facebook");

    let platforms: Vec<Box<dyn Platform>> = vec![
        Box::new(failing.clone()),
        Box::new(unconfigured.clone()),
        Box::new(healthy.clone()),
    ];
    let workflow = DailyWorkflow::new(
        CsvSource::from_config(&config),
        MediaFetcher::from_config(&config)?,
        ContentAdapter::from_config(&config),
        platforms,
    );

    let outcome = workflow.run(day()).await;

    let summary: Vec<(String, bool)> = outcome
        .results()
        .iter()
        .map(|r| (r.platform.clone(), r.success))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("linkedin".to_string(), false),
            ("twitter".to_string(), false),
            ("facebook".to_string(), true),
        ]
    );
    assert_eq!(unconfigured.post_call_count(), 0);

    // Short text skips summarization even for platforms that adapt
    assert_eq!(healthy.posted_content(), vec!["Short and sweet".to_string()]);
    let media = &healthy.calls()[0].media;
    assert!(!media.exists());
    Ok(())
}
