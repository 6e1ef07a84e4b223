/*!
 * Common test utilities for the lingsub test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use lingsub::app_config::Config;
use lingsub::providers::RemoteFile;
use lingsub::providers::FileState;

/// Raw model output with one line per speaker
pub const TWO_SPEAKER_SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nLing姐: 你好\n\n2\n00:00:03,500 --> 00:00:05,000\nOrm: 嗨\n";

/// Initialise env_logger once; repeated calls are ignored
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, TWO_SPEAKER_SRT)
}

/// Default config with an API key and no waits between retries or polls
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.transcription.api_key = "test-key".to_string();
    config.transcription.retry_backoff_ms = 1;
    config.transcription.poll_interval_ms = 1;
    config.transcription.max_polls = 5;
    config
}

/// Remote file handle as returned by an upload
pub fn remote_file(state: FileState) -> RemoteFile {
    RemoteFile {
        name: "files/test-audio".to_string(),
        uri: "https://example.invalid/files/test-audio".to_string(),
        mime_type: "audio/mpeg".to_string(),
        state,
    }
}
