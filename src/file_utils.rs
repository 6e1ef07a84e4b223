use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions of inputs that carry a video stream
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "mkv", "webm", "avi"];

/// Extensions of audio-only inputs
pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "aac", "flac", "ogg"];

/// Kind of an input file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Media with a video stream
    Video,
    /// Audio-only media
    Audio,
    /// Existing SRT subtitles
    Subtitle,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Whether ffmpeg has to extract audio from this input
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

/// Artifact written for an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Raw model output
    RawSubtitles,
    /// Styled subtitles
    StyledSubtitles,
    /// Video with a selectable subtitle track
    SoftVideo,
    /// Video with subtitles burned into the frames
    BurnedVideo,
}

impl Artifact {
    // @returns: File name suffix including the extension
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::RawSubtitles => "srt",
            Self::StyledSubtitles => "ass",
            Self::SoftVideo => "soft.mkv",
            Self::BurnedVideo => "burned.mp4",
        }
    }

    /// Whether `path` names a video rendered by an earlier run
    pub fn is_rendered_video<P: AsRef<Path>>(path: P) -> bool {
        let name = match path.as_ref().file_name() {
            Some(name) => name.to_string_lossy().to_lowercase(),
            None => return false,
        };
        [Self::SoftVideo, Self::BurnedVideo]
            .iter()
            .any(|artifact| name.ends_with(&format!(".{}", artifact.suffix())))
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for an artifact of `input_file`
    pub fn artifact_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        artifact: Artifact,
    ) -> PathBuf {
        let stem = input_file.as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        output_dir.as_ref().join(format!("{}.{}", stem, artifact.suffix()))
    }

    /// Find supported inputs below `dir`, sorted by path.
    ///
    /// Videos rendered by earlier runs (`*.soft.mkv`, `*.burned.mp4`) are not inputs.
    pub fn find_inputs<P: AsRef<Path>>(dir: P, include_subtitles: bool) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() || Artifact::is_rendered_video(path) {
                continue;
            }

            match Self::detect_file_type(path) {
                file_type if file_type.is_media() => result.push(path.to_path_buf()),
                FileType::Subtitle if include_subtitles => result.push(path.to_path_buf()),
                _ => {}
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect the input kind from the file extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let ext = match path.as_ref().extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return FileType::Unknown,
        };

        if ext == "srt" {
            FileType::Subtitle
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Audio
        } else {
            FileType::Unknown
        }
    }

    /// Detect the input kind, failing for missing or unsupported files
    pub fn detect_supported_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        match Self::detect_file_type(path) {
            FileType::Unknown => Err(anyhow!(
                "Unsupported input {:?}; expected one of {}, {} or srt",
                path,
                VIDEO_EXTENSIONS.join(", "),
                AUDIO_EXTENSIONS.join(", ")
            )),
            file_type => Ok(file_type),
        }
    }
}
