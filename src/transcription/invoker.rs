use std::time::Duration;

use log::{debug, info, warn};

use crate::errors::{FailureKind, TranscriptionError};
use crate::providers::{RemoteFile, TranscriptionProvider};

// @module: Retrying, falling-back invocation of the transcription service

/// Retry settings for one candidate model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per candidate before moving on
    pub max_attempts: u32,
    /// Backoff base; the wait after attempt n is `backoff_base * n`
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    /// Delay after the given 1-based attempt
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

/// Calls the provider across an ordered list of candidate models.
///
/// Rate limits are retried on the same model with a linear backoff, a missing
/// model is skipped at once, and any other failure aborts the whole call.
#[derive(Debug)]
pub struct ResilientInvoker<'a, P: TranscriptionProvider + ?Sized> {
    provider: &'a P,
    policy: RetryPolicy,
}

impl<'a, P: TranscriptionProvider + ?Sized> ResilientInvoker<'a, P> {
    pub fn new(provider: &'a P, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Return the first successful generation.
    ///
    /// Fails with `TranscriptionError::Provider` on the first fatal error and with
    /// `TranscriptionError::Exhausted` once every candidate has been given up on.
    pub async fn invoke(
        &self,
        file: &RemoteFile,
        prompt: &str,
        candidates: &[String],
    ) -> Result<String, TranscriptionError> {
        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_error = String::from("no candidate models were provided");

        for model in candidates {
            attempted.push(model.clone());

            for attempt in 1..=self.policy.max_attempts {
                debug!("Generating with {} (attempt {}/{})", model, attempt, self.policy.max_attempts);

                let error = match self.provider.generate(model, file, prompt).await {
                    Ok(text) => {
                        info!("Transcription produced by {}", model);
                        return Ok(text);
                    }
                    Err(error) => error,
                };

                match error.classify() {
                    FailureKind::Retryable => {
                        last_error = format!("{}: {}", model, error);
                        if attempt < self.policy.max_attempts {
                            let delay = self.policy.backoff_for(attempt);
                            warn!(
                                "{} is rate limited, retrying in {:.1}s ({}/{})",
                                model,
                                delay.as_secs_f32(),
                                attempt,
                                self.policy.max_attempts
                            );
                            tokio::time::sleep(delay).await;
                        } else {
                            warn!("{} still rate limited after {} attempts, trying next model", model, attempt);
                        }
                    }
                    FailureKind::NotFound => {
                        warn!("Model {} is not available, trying next model", model);
                        last_error = format!("{}: {}", model, error);
                        break;
                    }
                    FailureKind::Fatal => return Err(TranscriptionError::Provider(error)),
                }
            }
        }

        Err(TranscriptionError::Exhausted {
            candidates: attempted,
            last_error,
        })
    }
}
