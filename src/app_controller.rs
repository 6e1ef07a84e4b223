use anyhow::{Result, Context, anyhow};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::{Config, VideoOutputMode};
use crate::errors::SubtitleError;
use crate::file_utils::{Artifact, FileManager, FileType};
use crate::media::MediaTool;
use crate::providers::TranscriptionProvider;
use crate::providers::gemini::Gemini;
use crate::styling::convert_srt_to_ass;
use crate::transcription::TranscriptionService;

// @module: Application controller for the subtitle pipeline

/// Files produced for one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArtifacts {
    /// Raw subtitles as returned by the model
    pub raw_subtitles: Option<PathBuf>,
    /// Styled subtitle document
    pub styled_subtitles: Option<PathBuf>,
    /// Video with embedded subtitles
    pub video: Option<PathBuf>,
    /// The input was skipped because its output already exists
    pub skipped: bool,
}

impl RunArtifacts {
    fn skipped() -> Self {
        Self { skipped: true, ..Self::default() }
    }
}

/// Counts reported after a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Parent directory for per-run working directories, system temp when unset
    temp_root: Option<PathBuf>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            temp_root: None,
        })
    }

    /// Create working directories below `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn provider(&self) -> Gemini {
        Gemini::new(
            self.config.transcription.api_key.clone(),
            self.config.transcription.endpoint.clone(),
            self.config.transcription.timeout_secs,
        )
    }

    /// Process one input against the hosted service
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<RunArtifacts> {
        let provider = self.provider();
        self.run_with_provider(&provider, &input_file, &output_dir, force_overwrite).await
    }

    /// Process one input with the given provider.
    ///
    /// SRT inputs are only styled. Media inputs go through audio extraction,
    /// transcription, styling and the optional video step.
    pub async fn run_with_provider<P: TranscriptionProvider + ?Sized>(
        &self,
        provider: &P,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<RunArtifacts> {
        let start_time = Instant::now();
        let file_type = FileManager::detect_supported_type(input_file)?;

        if file_type == FileType::Subtitle {
            info!("Detected subtitle file, styling only");
            return self.style_only(input_file, output_dir, force_overwrite);
        }

        FileManager::ensure_dir(output_dir)?;

        if !force_overwrite {
            if let Some(existing) = Self::existing_subtitles(input_file, output_dir) {
                warn!("Skipping {}, {} already exists (use -f to force overwrite)", input_file.display(), existing.display());
                return Ok(RunArtifacts::skipped());
            }
        }

        // Removed on drop, whatever way this function returns
        let work_dir = self.create_work_dir()?;
        debug!("Working directory: {}", work_dir.path().display());

        let spinner = Self::spinner("Extracting audio");
        let media = MediaTool::new(&self.config.media);
        let audio_path = match media.extract_audio(input_file, work_dir.path()).await {
            Ok(path) => path,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e).context("Audio extraction failed");
            }
        };

        spinner.set_message("Transcribing");
        let transcribed = self.transcribe_audio(provider, &audio_path, input_file, output_dir, force_overwrite).await;
        spinner.finish_and_clear();
        let mut artifacts = transcribed?;

        if let Some(styled) = artifacts.styled_subtitles.clone() {
            artifacts.video = self.render_video(&media, input_file, file_type, &styled, output_dir).await?;
        }

        info!(
            "Completed {} in {}",
            input_file.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(artifacts)
    }

    /// Transcribe already extracted audio and write both subtitle artifacts named after `input_file`.
    ///
    /// Existing `.srt` or `.ass` files are left alone unless `force_overwrite` is set.
    pub async fn transcribe_audio<P: TranscriptionProvider + ?Sized>(
        &self,
        provider: &P,
        audio_path: &Path,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<RunArtifacts> {
        if !force_overwrite {
            if let Some(existing) = Self::existing_subtitles(input_file, output_dir) {
                warn!("Not transcribing {}, {} already exists", input_file.display(), existing.display());
                return Ok(RunArtifacts::skipped());
            }
        }

        let service = TranscriptionService::new(
            provider,
            self.config.transcription.clone(),
            self.config.roles.clone(),
        );
        let raw = service.transcribe(audio_path).await?;

        let raw_path = FileManager::artifact_path(input_file, output_dir, Artifact::RawSubtitles);
        FileManager::write_to_file(&raw_path, &raw)?;
        info!("Raw subtitles: {}", raw_path.display());

        let styled_path = self.write_styled(&raw, input_file, output_dir)?;

        Ok(RunArtifacts {
            raw_subtitles: Some(raw_path),
            styled_subtitles: Some(styled_path),
            ..RunArtifacts::default()
        })
    }

    /// Style an existing SRT file
    pub fn style_only(&self, srt_file: &Path, output_dir: &Path, force_overwrite: bool) -> Result<RunArtifacts> {
        let styled_path = FileManager::artifact_path(srt_file, output_dir, Artifact::StyledSubtitles);
        if FileManager::file_exists(&styled_path) && !force_overwrite {
            warn!("Skipping {}, styled subtitles already exist (use -f to force overwrite)", srt_file.display());
            return Ok(RunArtifacts::skipped());
        }

        let raw = FileManager::read_to_string(srt_file)?;
        let styled_path = self.write_styled(&raw, srt_file, output_dir)?;

        Ok(RunArtifacts {
            styled_subtitles: Some(styled_path),
            ..RunArtifacts::default()
        })
    }

    // First subtitle artifact of `input_file` already present in `output_dir`
    fn existing_subtitles(input_file: &Path, output_dir: &Path) -> Option<PathBuf> {
        [Artifact::RawSubtitles, Artifact::StyledSubtitles]
            .into_iter()
            .map(|artifact| FileManager::artifact_path(input_file, output_dir, artifact))
            .find(|path| FileManager::file_exists(path))
    }

    fn write_styled(&self, raw: &str, input_file: &Path, output_dir: &Path) -> Result<PathBuf> {
        let document = convert_srt_to_ass(
            raw,
            &self.config.roles,
            self.config.transcription.ambiguity_policy,
            &self.config.style,
        );

        if document.dialogue_count() == 0 {
            return Err(SubtitleError::NoCues(input_file.display().to_string()).into());
        }

        let styled_path = FileManager::artifact_path(input_file, output_dir, Artifact::StyledSubtitles);
        FileManager::write_to_file(&styled_path, &document.to_string())?;
        info!("Styled subtitles: {} ({} lines)", styled_path.display(), document.dialogue_count());

        Ok(styled_path)
    }

    async fn render_video(
        &self,
        media: &MediaTool,
        input_file: &Path,
        file_type: FileType,
        styled_path: &Path,
        output_dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let mode = self.config.media.video_mode;
        if mode == VideoOutputMode::None {
            return Ok(None);
        }
        if file_type != FileType::Video {
            warn!("Video mode '{}' ignored for audio-only input {}", mode, input_file.display());
            return Ok(None);
        }

        let spinner = Self::spinner("Rendering video");
        let result = match mode {
            VideoOutputMode::Soft => {
                let output = FileManager::artifact_path(input_file, output_dir, Artifact::SoftVideo);
                media.embed_soft(input_file, styled_path, &output, &self.config.transcription.target_language)
                    .await
                    .map(|_| output)
            }
            _ => {
                let output = FileManager::artifact_path(input_file, output_dir, Artifact::BurnedVideo);
                media.burn_in(input_file, styled_path, &output).await.map(|_| output)
            }
        };
        spinner.finish_and_clear();

        let output = result.context("Video rendering failed")?;
        info!("Video: {}", output.display());
        Ok(Some(output))
    }

    /// Process every supported input below `input_dir`, writing next to each input
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let provider = self.provider();
        self.run_folder_with_provider(&provider, &input_dir, force_overwrite).await
    }

    pub async fn run_folder_with_provider<P: TranscriptionProvider + ?Sized>(
        &self,
        provider: &P,
        input_dir: &Path,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let inputs = FileManager::find_inputs(input_dir, false)?;
        if inputs.is_empty() {
            return Err(anyhow!("No media files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(inputs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for input in &inputs {
            let file_name = input.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = input.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.to_path_buf());

            match self.run_with_provider(provider, input, &output_dir, force_overwrite).await {
                Ok(artifacts) if artifacts.skipped => summary.skipped += 1,
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();
        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    fn create_work_dir(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("lingsub-");
        let dir = match &self.temp_root {
            Some(root) => {
                FileManager::ensure_dir(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        };
        dir.context("Failed to create working directory")
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
