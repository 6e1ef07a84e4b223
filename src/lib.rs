/*!
 * # lingsub - speaker-styled subtitles with Gemini
 *
 * A Rust library that turns a two-speaker video into translated, speaker-colored
 * subtitles.
 *
 * ## Features
 *
 * - Extract a compact mono audio track with ffmpeg
 * - Transcribe and translate it with Gemini, retrying on rate limits and falling
 *   back across candidate models
 * - Parse the returned SRT leniently
 * - Classify every line by speaker and render a styled ASS document
 * - Optionally mux or burn the subtitles into the video
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and time code conversion
 * - `styling`: Speaker classification and ASS rendering:
 *   - `styling::speakers`: Speaker attribution by label
 *   - `styling::ass`: Styles, header and dialogue lines
 * - `transcription`: Prompt, retry and model selection:
 *   - `transcription::prompts`: Prompt construction and output cleanup
 *   - `transcription::invoker`: Retry and fallback across candidates
 *   - `transcription::discovery`: Model discovery
 * - `providers`: Transcription service clients (`gemini`, `mock`)
 * - `media`: ffmpeg invocations
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod styling;
pub mod transcription;
pub mod media;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{Cue, parse_cues, to_display_timestamp};
pub use styling::{StyleName, convert_srt_to_ass};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, ProviderError, SubtitleError, TranscriptionError};
