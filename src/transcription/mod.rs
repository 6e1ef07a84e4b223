/*!
 * Transcription through the hosted generative service.
 *
 * - `prompts`: Builds the instruction text and cleans the returned output
 * - `invoker`: Retries and falls back across candidate models
 * - `discovery`: Picks a fast, stable model from the service's listing
 *
 * `TranscriptionService` ties these together for one audio file: upload, wait
 * for remote processing, generate, and delete the upload again.
 */

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::app_config::{RoleConfig, TranscriptionConfig};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{FileState, RemoteFile, TranscriptionProvider};

pub mod discovery;
pub mod invoker;
pub mod prompts;

pub use discovery::{build_candidates, pick_model, select_model};
pub use invoker::{ResilientInvoker, RetryPolicy};
pub use prompts::{build_prompt, clean_model_output, PromptOptions};

/// Poll the remote file until it leaves the processing state.
///
/// Fails when processing fails or when `max_polls` polls pass without a result.
pub async fn wait_until_active<P: TranscriptionProvider + ?Sized>(
    provider: &P,
    file: RemoteFile,
    interval: Duration,
    max_polls: u32,
) -> Result<RemoteFile, ProviderError> {
    let mut current = file;
    let mut polls = 0;

    while current.state == FileState::Processing {
        if polls >= max_polls {
            return Err(ProviderError::FileProcessingFailed(format!(
                "{} timed out after {} polls",
                current.name, polls
            )));
        }
        tokio::time::sleep(interval).await;
        current = provider.get_file(&current.name).await?;
        polls += 1;
    }

    match current.state {
        FileState::Failed => Err(ProviderError::FileProcessingFailed(format!("{} failed remote processing", current.name))),
        _ => {
            debug!("{} ready after {} polls", current.name, polls);
            Ok(current)
        }
    }
}

/// Guess the upload MIME type from the audio file extension
pub fn audio_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
        Some("wav") => "audio/wav",
        Some("m4a") | Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        _ => "audio/mpeg",
    }
}

/// Runs one transcription against a provider
#[derive(Debug)]
pub struct TranscriptionService<'a, P: TranscriptionProvider + ?Sized> {
    provider: &'a P,
    config: TranscriptionConfig,
    roles: RoleConfig,
}

impl<'a, P: TranscriptionProvider + ?Sized> TranscriptionService<'a, P> {
    pub fn new(provider: &'a P, config: TranscriptionConfig, roles: RoleConfig) -> Self {
        Self { provider, config, roles }
    }

    /// The prompt that will be sent for this configuration
    pub fn prompt(&self) -> Result<String> {
        let options = PromptOptions {
            target_language: language_utils::prompt_language_name(&self.config.target_language)?,
            tone: self.config.tone.clone(),
            terminology: self.config.terminology.clone(),
        };
        Ok(build_prompt(&self.roles, &options))
    }

    /// Candidate models in the order they will be tried
    pub async fn candidates(&self) -> Vec<String> {
        let discovered = if self.config.discover_models {
            let fallback = self.config.fallback_model();
            Some(select_model(self.provider, &self.config.model_family, &fallback).await)
        } else {
            None
        };
        build_candidates(discovered.as_deref(), &self.config.candidate_models)
    }

    /// Upload the audio, generate subtitles and return the cleaned SRT text
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let prompt = self.prompt()?;

        let uploaded = self.provider
            .upload_audio(audio_path, audio_mime_type(audio_path))
            .await
            .context("Failed to upload audio")?;
        info!("Uploaded audio as {}", uploaded.name);

        let result = self.generate_for(uploaded.clone(), &prompt).await;

        if let Err(e) = self.provider.delete_file(&uploaded.name).await {
            warn!("Failed to delete remote file {}: {}", uploaded.name, e);
        }

        result
    }

    async fn generate_for(&self, uploaded: RemoteFile, prompt: &str) -> Result<String> {
        let ready = wait_until_active(
            self.provider,
            uploaded,
            Duration::from_millis(self.config.poll_interval_ms),
            self.config.max_polls,
        )
        .await
        .context("Remote audio processing did not complete")?;

        let candidates = self.candidates().await;
        info!("Candidate models: {}", candidates.join(", "));

        let policy = RetryPolicy::new(
            self.config.retry_count,
            Duration::from_millis(self.config.retry_backoff_ms),
        );
        let text = ResilientInvoker::new(self.provider, policy)
            .invoke(&ready, prompt, &candidates)
            .await?;

        Ok(clean_model_output(&text))
    }
}
