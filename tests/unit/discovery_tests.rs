/*!
 * Tests for model discovery and the remote processing poll
 */

use std::time::Duration;

use lingsub::errors::ProviderError;
use lingsub::providers::{FileState, ModelInfo};
use lingsub::providers::mock::{MockCall, MockProvider};
use lingsub::transcription::{build_candidates, pick_model, select_model, wait_until_active};
use crate::common;

#[tokio::test]
async fn test_selectModel_withListing_shouldPickShortestFlash() {
    let provider = MockProvider::new().with_listed_models(&[
        "models/gemini-1.5-flash-8b-exp-0924",
        "models/gemini-1.5-flash",
        "models/gemini-1.5-pro",
        "models/gemini-1.5-flash-002",
    ]);

    let model = select_model(&provider, "flash", "fallback").await;

    assert_eq!(model, "gemini-1.5-flash");
}

#[tokio::test]
async fn test_selectModel_withFailingListing_shouldReturnFallback() {
    let provider = MockProvider::new().with_failing_listing();

    assert_eq!(select_model(&provider, "flash", "gemini-1.5-flash").await, "gemini-1.5-flash");
    assert_eq!(provider.calls(), vec![MockCall::ListModels]);
}

#[tokio::test]
async fn test_selectModel_withNoMatchingFamily_shouldReturnFallback() {
    let provider = MockProvider::new().with_model_infos(vec![
        ModelInfo {
            name: "models/text-embedding-004".to_string(),
            supported_methods: vec!["embedContent".to_string()],
        },
        ModelInfo {
            name: "models/gemini-flash-embed".to_string(),
            supported_methods: vec!["embedContent".to_string()],
        },
    ]);

    assert_eq!(select_model(&provider, "flash", "fallback-model").await, "fallback-model");
}

#[test]
fn test_pickModel_withEqualLengths_shouldBreakTieLexicographically() {
    let models: Vec<ModelInfo> = ["gemini-2.0-flash", "gemini-1.5-flash"]
        .iter()
        .map(|name| ModelInfo {
            name: name.to_string(),
            supported_methods: vec!["generateContent".to_string()],
        })
        .collect();

    assert_eq!(pick_model(&models, "flash").as_deref(), Some("gemini-1.5-flash"));
}

#[test]
fn test_buildCandidates_withDiscoveredAlreadyConfigured_shouldNotRepeatIt() {
    let configured = vec!["gemini-1.5-flash".to_string(), "gemini-1.5-pro".to_string()];

    assert_eq!(
        build_candidates(Some("gemini-1.5-flash"), &configured),
        vec!["gemini-1.5-flash", "gemini-1.5-pro"]
    );
    assert_eq!(
        build_candidates(Some("gemini-2.0-flash"), &configured),
        vec!["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"]
    );
}

#[tokio::test]
async fn test_waitUntilActive_withProcessingFile_shouldPollUntilActive() {
    let provider = MockProvider::new()
        .with_file_states(&[FileState::Processing, FileState::Processing, FileState::Active]);

    let file = wait_until_active(&provider, common::remote_file(FileState::Processing), Duration::from_millis(1), 10)
        .await
        .unwrap();

    assert_eq!(file.state, FileState::Active);
    let polls = provider.calls().iter().filter(|c| matches!(c, MockCall::GetFile(_))).count();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn test_waitUntilActive_withActiveFile_shouldNotPoll() {
    let provider = MockProvider::new();

    let file = wait_until_active(&provider, common::remote_file(FileState::Active), Duration::from_millis(1), 10)
        .await
        .unwrap();

    assert_eq!(file.name, "files/test-audio");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_waitUntilActive_withFailedProcessing_shouldError() {
    let provider = MockProvider::new().with_file_states(&[FileState::Processing, FileState::Failed]);

    let result = wait_until_active(&provider, common::remote_file(FileState::Processing), Duration::from_millis(1), 10).await;

    assert!(matches!(result, Err(ProviderError::FileProcessingFailed(_))));
}

#[tokio::test]
async fn test_waitUntilActive_withEndlessProcessing_shouldTimeOut() {
    let provider = MockProvider::new().with_file_states(&[FileState::Processing]);

    let result = wait_until_active(&provider, common::remote_file(FileState::Processing), Duration::from_millis(1), 4).await;

    match result {
        Err(ProviderError::FileProcessingFailed(message)) => assert!(message.contains("timed out after 4 polls")),
        other => panic!("expected a processing timeout, got {:?}", other),
    }
    assert_eq!(provider.calls().len(), 4);
}
