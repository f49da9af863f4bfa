//! Integration tests for the extraction and scoring stages
//!
//! A wiremock server stands in for the chat completions API.

use scholar_harvest::config::{Config, ExtractionConfig, OutputConfig};
use scholar_harvest::extraction::schema::scholarship_schema;
use scholar_harvest::extraction::{
    evaluate_eligibility, run_extraction, ExtractionError, OpenAiExtractor, StructuredExtractor,
};
use scholar_harvest::storage::{FileStorage, SiteStorage};
use scholar_harvest::HarvestError;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn extraction_config(server: &MockServer) -> ExtractionConfig {
    ExtractionConfig {
        base_url: format!("{}/v1", server.uri()),
        model: "test-model".to_string(),
        ..Default::default()
    }
}

/// Wraps `content` the way the completions API returns it
fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

fn create_test_config(root: &Path, server: &MockServer) -> Config {
    Config {
        output: OutputConfig {
            scrape_dir: root.join("scrape"),
            process_dir: root.join("processed"),
            credentials_dir: root.join("credentials"),
            results_dir: root.join("results"),
        },
        extraction: extraction_config(server),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_extractor_sends_schema_and_parses_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "scholarship", "strict": false }
            }
        })))
        .respond_with(completion(r#"{"name": "Global Award", "degreeTypes": ["MSC"]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extractor =
        OpenAiExtractor::new(&extraction_config(&mock_server), "test-key".to_string()).unwrap();
    let value = extractor
        .extract("Based on the following text", &scholarship_schema())
        .await
        .expect("Extraction failed");

    assert_eq!(value["name"], "Global Award");
    assert_eq!(value["degreeTypes"], json!(["MSC"]));
}

#[tokio::test]
async fn test_extractor_reports_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let extractor =
        OpenAiExtractor::new(&extraction_config(&mock_server), "test-key".to_string()).unwrap();
    let err = extractor
        .extract("prompt", &scholarship_schema())
        .await
        .unwrap_err();

    match err {
        ExtractionError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("Unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_extractor_rejects_non_json_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("I could not find any scholarship."))
        .mount(&mock_server)
        .await;

    let extractor =
        OpenAiExtractor::new(&extraction_config(&mock_server), "test-key".to_string()).unwrap();
    let err = extractor
        .extract("prompt", &scholarship_schema())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::InvalidJson(_)));
}

#[tokio::test]
async fn test_run_extraction_writes_processed_files() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(
            r#"{
                "name": "Global Award",
                "provider": "Alpha University",
                "eligibleCountries": ["Kenya", "Ghana"],
                "additionalInfo": { "websiteUrl": "https://alpha.edu/award" }
            }"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &mock_server);

    let mut storage = FileStorage::new(&config.output.scrape_dir).unwrap();
    storage
        .commit_page("alpha", "https://alpha.edu/", "Global Award for graduate study")
        .unwrap();
    storage
        .commit_page("alpha", "https://alpha.edu/apply", "Deadline: March")
        .unwrap();

    let extractor =
        OpenAiExtractor::new(&config.extraction, "test-key".to_string()).unwrap();
    let summary = run_extraction(&config, &extractor).await.unwrap();

    assert_eq!(summary.processed, vec!["alpha".to_string()]);
    assert!(summary.failed.is_empty());

    let text =
        std::fs::read_to_string(config.output.process_dir.join("alpha_processed.txt")).unwrap();
    assert!(text.contains("NAME: Global Award\n"));
    assert!(text.contains("ELIGIBLECOUNTRIES:\n  - Kenya\n  - Ghana\n"));
    assert!(text.contains("ADDITIONALINFO:\n  WEBSITEURL: https://alpha.edu/award\n"));

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(config.output.process_dir.join("alpha_processed.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["provider"], "Alpha University");

    // Prompt carries the stored page text
    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.starts_with("Based on the following text from alpha,"));
    assert!(prompt.contains("Deadline: March"));
}

#[tokio::test]
async fn test_unwritable_output_does_not_stop_extraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(r#"{"name": "Global Award"}"#))
        .expect(2)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &mock_server);

    let mut storage = FileStorage::new(&config.output.scrape_dir).unwrap();
    storage
        .commit_page("alpha", "https://alpha.edu/", "Alpha award")
        .unwrap();
    storage
        .commit_page("beta", "https://beta.edu/", "Beta award")
        .unwrap();

    // A directory in the way makes the alpha text report unwritable
    std::fs::create_dir_all(config.output.process_dir.join("alpha_processed.txt")).unwrap();

    let extractor =
        OpenAiExtractor::new(&config.extraction, "test-key".to_string()).unwrap();
    let summary = run_extraction(&config, &extractor).await.unwrap();

    assert_eq!(summary.failed, vec!["alpha".to_string()]);
    assert_eq!(summary.processed, vec!["beta".to_string()]);
    let text =
        std::fs::read_to_string(config.output.process_dir.join("beta_processed.txt")).unwrap();
    assert!(text.contains("NAME: Global Award\n"));
}

#[tokio::test]
async fn test_run_extraction_without_scraped_data() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &mock_server);

    let extractor =
        OpenAiExtractor::new(&config.extraction, "test-key".to_string()).unwrap();
    let err = run_extraction(&config, &extractor).await.unwrap_err();

    assert!(matches!(err, HarvestError::Setup(_)));
}

#[tokio::test]
async fn test_scoring_error_yields_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scorer =
        OpenAiExtractor::new(&extraction_config(&mock_server), "test-key".to_string()).unwrap();
    let result = evaluate_eligibility(&scorer, "NAME: Global Award", Some("MSc Physics")).await;

    assert_eq!(result.scholarship_name, "Unknown Scholarship");
    assert_eq!(result.eligibility_score, 0.0);
    assert_eq!(result.reasons, vec!["Error occurred during evaluation"]);
}
