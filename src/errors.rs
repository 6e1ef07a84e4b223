/*!
 * Error types for the lingsub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// How a provider failure should be handled by the invocation wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transient (rate limit, quota). Retry the same model after a backoff
    Retryable,
    /// The model variant is not offered to this credential. Skip to the next one
    NotFound,
    /// Anything else. Abort the whole operation
    Fatal,
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The requested model does not exist or is not available for this key
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The uploaded file could not be processed remotely
    #[error("Remote file processing failed: {0}")]
    FileProcessingFailed(String),
}

impl ProviderError {
    /// Classify this failure for retry purposes.
    ///
    /// Structured variants and HTTP status codes are used when present. Only the
    /// variants that carry a bare message fall back to substring heuristics, which
    /// can misclassify an error whose text happens to mention a code.
    pub fn classify(&self) -> FailureKind {
        match self {
            Self::RateLimitExceeded(_) => FailureKind::Retryable,
            Self::ModelNotFound(_) => FailureKind::NotFound,
            Self::ApiError { status_code: 429, .. } => FailureKind::Retryable,
            Self::ApiError { status_code: 404, .. } => FailureKind::NotFound,
            Self::RequestFailed(message) | Self::ConnectionError(message) => {
                classify_message(message)
            }
            _ => FailureKind::Fatal,
        }
    }
}

fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("429")
        || lower.contains("quota")
        || lower.contains("resource_exhausted")
        || lower.contains("rate limit")
    {
        FailureKind::Retryable
    } else if lower.contains("404") || lower.contains("not found") || lower.contains("not_found") {
        FailureKind::NotFound
    } else {
        FailureKind::Fatal
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle text produced no usable cues
    #[error("No subtitle cues could be parsed from {0}")]
    NoCues(String),
}

/// Errors that can occur while obtaining a transcription
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// A fatal error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every candidate model was tried and none produced a result
    #[error("All candidate models exhausted ({}): {last_error}", .candidates.join(", "))]
    Exhausted {
        /// Models that were attempted, in order
        candidates: Vec<String>,
        /// Description of the last failure seen
        last_error: String,
    },
}

/// Errors from the external media tool
#[derive(Error, Debug)]
pub enum MediaError {
    /// The binary could not be started
    #[error("{tool} could not be started: {message}")]
    ToolNotFound {
        tool: String,
        message: String,
    },

    /// The tool exited with a non-zero status
    #[error("{tool} failed: {message}")]
    ProcessFailed {
        tool: String,
        message: String,
    },

    /// The tool did not finish within the configured time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        tool: String,
        secs: u64,
    },

    /// Filesystem error around the tool invocation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from transcription
    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Error from the media tool
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
