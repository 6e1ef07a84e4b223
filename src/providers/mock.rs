/*!
 * Mock provider implementation for testing.
 *
 * The mock simulates the hosted service without network access:
 * - each model name is mapped to a `MockBehavior` (success, rate limit, missing, fatal)
 * - uploads go through a scripted sequence of processing states
 * - every call is recorded so tests can assert on the exact call order
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{FileState, ModelInfo, RemoteFile, TranscriptionProvider};

/// Behavior of one model in the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always returns the given text
    Succeed(String),
    /// Always fails with a rate limit error
    RateLimited,
    /// Fails with a rate limit error `times` times, then returns the text
    RateLimitedThen { times: usize, text: String },
    /// The model does not exist
    NotFound,
    /// Always fails with a non-retryable error
    Fatal,
}

/// Call recorded by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Upload(String),
    GetFile(String),
    Delete(String),
    Generate(String),
    ListModels,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    generate_counts: HashMap<String, usize>,
    file_states: VecDeque<FileState>,
    last_prompt: Option<String>,
}

/// Mock transcription provider
#[derive(Debug, Clone)]
pub struct MockProvider {
    behaviors: HashMap<String, MockBehavior>,
    models: Option<Vec<ModelInfo>>,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a mock with no models configured
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            models: Some(Vec::new()),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a mock where `model` always succeeds with `text`
    pub fn working(model: &str, text: &str) -> Self {
        Self::new().with_model(model, MockBehavior::Succeed(text.to_string()))
    }

    /// Set the behavior for a model
    pub fn with_model(mut self, model: &str, behavior: MockBehavior) -> Self {
        self.behaviors.insert(model.to_string(), behavior);
        self
    }

    /// Models returned by `list_models`; each supports generateContent
    pub fn with_listed_models(mut self, names: &[&str]) -> Self {
        self.models = Some(
            names.iter()
                .map(|name| ModelInfo {
                    name: name.to_string(),
                    supported_methods: vec!["generateContent".to_string()],
                })
                .collect(),
        );
        self
    }

    /// Models returned by `list_models` with explicit methods
    pub fn with_model_infos(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = Some(models);
        self
    }

    /// Make `list_models` fail
    pub fn with_failing_listing(mut self) -> Self {
        self.models = None;
        self
    }

    /// States returned by successive `get_file` calls; the last state repeats
    pub fn with_file_states(self, states: &[FileState]) -> Self {
        self.state.lock().file_states = states.iter().copied().collect();
        self
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Number of generate calls made against `model`
    pub fn generate_count(&self, model: &str) -> usize {
        self.state.lock().generate_counts.get(model).copied().unwrap_or(0)
    }

    /// Prompt passed to the most recent generate call
    pub fn last_prompt(&self) -> Option<String> {
        self.state.lock().last_prompt.clone()
    }

    fn remote_file(name: &str, state: FileState) -> RemoteFile {
        RemoteFile {
            name: name.to_string(),
            uri: format!("mock://{}", name),
            mime_type: "audio/mpeg".to_string(),
            state,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionProvider for MockProvider {
    async fn upload_audio(&self, path: &Path, _mime_type: &str) -> Result<RemoteFile, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Upload(path.display().to_string()));
        let initial = if state.file_states.is_empty() { FileState::Active } else { FileState::Processing };
        Ok(Self::remote_file("files/mock-audio", initial))
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::GetFile(name.to_string()));
        let next = if state.file_states.len() > 1 {
            state.file_states.pop_front()
        } else {
            state.file_states.front().copied()
        };
        Ok(Self::remote_file(name, next.unwrap_or(FileState::Active)))
    }

    async fn delete_file(&self, name: &str) -> Result<(), ProviderError> {
        self.state.lock().calls.push(MockCall::Delete(name.to_string()));
        Ok(())
    }

    async fn generate(&self, model: &str, _file: &RemoteFile, prompt: &str) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Generate(model.to_string()));
        state.last_prompt = Some(prompt.to_string());
        let count = {
            let counter = state.generate_counts.entry(model.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };

        match self.behaviors.get(model) {
            Some(MockBehavior::Succeed(text)) => Ok(text.clone()),
            Some(MockBehavior::RateLimited) => Err(ProviderError::RateLimitExceeded(format!("429 quota exceeded for {}", model))),
            Some(MockBehavior::RateLimitedThen { times, text }) => {
                if count <= *times {
                    Err(ProviderError::RateLimitExceeded(format!("429 quota exceeded for {}", model)))
                } else {
                    Ok(text.clone())
                }
            }
            Some(MockBehavior::Fatal) => Err(ProviderError::ApiError {
                status_code: 400,
                message: format!("invalid request for {}", model),
            }),
            Some(MockBehavior::NotFound) | None => Err(ProviderError::ModelNotFound(format!("models/{} is not found", model))),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        self.state.lock().calls.push(MockCall::ListModels);
        self.models.clone()
            .ok_or_else(|| ProviderError::ConnectionError("mock listing unavailable".to_string()))
    }
}
