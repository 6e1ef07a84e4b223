/*!
 * Provider implementations for transcription services.
 *
 * This module contains client implementations for the hosted service and a
 * scriptable mock:
 * - Gemini: Google Generative Language REST API
 * - Mock: In-process provider with per-model behavior, used by tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ProviderError;

/// Processing state of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Processing,
    Active,
    Failed,
    Unknown,
}

impl FileState {
    /// Parse the state string reported by the service
    pub fn from_api(state: &str) -> Self {
        match state {
            "PROCESSING" => Self::Processing,
            "ACTIVE" => Self::Active,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Handle to audio that has been uploaded to the service
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    /// URI to reference the file in generation requests
    pub uri: String,
    pub mime_type: String,
    pub state: FileState,
}

/// A model advertised by the service
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model name without the `models/` prefix
    pub name: String,
    /// Methods the model supports, e.g. `generateContent`
    pub supported_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generation(&self) -> bool {
        self.supported_methods.iter().any(|m| m == "generateContent")
    }
}

/// Common trait for transcription providers
///
/// This trait defines the interface the pipeline needs from the external
/// service, allowing the hosted API and the mock to be used interchangeably.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync + Debug {
    /// Upload an audio file and return its remote handle
    async fn upload_audio(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ProviderError>;

    /// Fetch the current state of an uploaded file
    async fn get_file(&self, name: &str) -> Result<RemoteFile, ProviderError>;

    /// Delete an uploaded file
    async fn delete_file(&self, name: &str) -> Result<(), ProviderError>;

    /// Ask `model` to follow `prompt` on the uploaded audio and return the text
    async fn generate(&self, model: &str, file: &RemoteFile, prompt: &str) -> Result<String, ProviderError>;

    /// List the models currently available to this credential
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;
}

pub mod gemini;
pub mod mock;
