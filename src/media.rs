use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use log::{debug, error, info};
use tokio::process::Command;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;
use crate::language_utils;

// @module: ffmpeg invocations for audio extraction and subtitle embedding

/// Name of the extracted audio file inside the working directory
pub const AUDIO_FILE_NAME: &str = "audio.mp3";

/// Wrapper around the ffmpeg binary
#[derive(Debug, Clone)]
pub struct MediaTool {
    // @field: Binary name or path
    ffmpeg_path: String,

    // @field: Limit for one invocation
    timeout: Duration,

    sample_rate: u32,
    channels: u32,
    bitrate_kbps: u32,
    fonts_dir: Option<PathBuf>,
}

impl MediaTool {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            sample_rate: config.sample_rate,
            channels: config.channels,
            bitrate_kbps: config.bitrate_kbps,
            fonts_dir: config.fonts_dir.as_ref().map(PathBuf::from),
        }
    }

    /// Arguments that turn `input` into a compact mono MP3 at `output`
    pub fn extract_audio_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-ac".to_string(),
            self.channels.to_string(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-b:a".to_string(),
            format!("{}k", self.bitrate_kbps),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Arguments that add `subtitles` as a selectable ASS track, copying all other streams
    pub fn soft_subtitle_args(&self, video: &Path, subtitles: &Path, output: &Path, language: &str) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-i".to_string(),
            subtitles.to_string_lossy().into_owned(),
            "-map".to_string(),
            "0".to_string(),
            "-map".to_string(),
            "1".to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-c:s".to_string(),
            "ass".to_string(),
        ];
        if let Ok(tag) = language_utils::normalize_to_part2t(language) {
            args.push("-metadata:s:s:0".to_string());
            args.push(format!("language={}", tag));
        }
        args.push(output.to_string_lossy().into_owned());
        args
    }

    /// Arguments that render `subtitles` into the video frames
    pub fn burn_subtitle_args(&self, video: &Path, subtitles: &Path, output: &Path) -> Vec<String> {
        let mut filter = format!("subtitles={}", escape_filter_path(subtitles));
        if let Some(dir) = &self.fonts_dir {
            filter.push_str(":fontsdir=");
            filter.push_str(&escape_filter_path(dir));
        }
        vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-vf".to_string(),
            filter,
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Extract the audio track of `input` into `work_dir`
    pub async fn extract_audio(&self, input: &Path, work_dir: &Path) -> Result<PathBuf, MediaError> {
        let output = work_dir.join(AUDIO_FILE_NAME);
        info!("Extracting audio from {}", input.display());
        self.run(self.extract_audio_args(input, &output)).await?;

        let size = std::fs::metadata(&output)?.len();
        if size == 0 {
            return Err(MediaError::ProcessFailed {
                tool: self.ffmpeg_path.clone(),
                message: format!("no audio could be extracted from {}", input.display()),
            });
        }
        debug!("Extracted {} bytes of audio", size);
        Ok(output)
    }

    /// Write a copy of `video` carrying `subtitles` as a soft track
    pub async fn embed_soft(&self, video: &Path, subtitles: &Path, output: &Path, language: &str) -> Result<(), MediaError> {
        info!("Muxing subtitle track into {}", output.display());
        self.run(self.soft_subtitle_args(video, subtitles, output, language)).await
    }

    /// Write a re-encoded copy of `video` with `subtitles` burned in
    pub async fn burn_in(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<(), MediaError> {
        info!("Burning subtitles into {}", output.display());
        self.run(self.burn_subtitle_args(video, subtitles, output)).await
    }

    async fn run(&self, args: Vec<String>) -> Result<(), MediaError> {
        debug!("Running {} {}", self.ffmpeg_path, args.join(" "));

        let ffmpeg_future = Command::new(&self.ffmpeg_path)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let output: Output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| MediaError::ToolNotFound {
                    tool: self.ffmpeg_path.clone(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(MediaError::Timeout {
                    tool: self.ffmpeg_path.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("ffmpeg exited with {}: {}", output.status, filtered);
            return Err(MediaError::ProcessFailed {
                tool: self.ffmpeg_path.clone(),
                message: filtered,
            });
        }

        Ok(())
    }
}

/// Escape a path for use inside an ffmpeg filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('=', "\\=")
        .replace('\'', "\\'")
        .replace(',', "\\,")
}

/// Keep only the meaningful lines of ffmpeg stderr, dropping the banner and stream listing
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    const NOISE_PREFIXES: [&str; 17] = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "title",
        "encoder",
        "BPS",
        "DURATION",
        "NUMBER_OF",
        "_STATISTICS",
        "Output #",
        "Stream mapping:",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("Press [q]"))
        .filter(|line| !NOISE_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
