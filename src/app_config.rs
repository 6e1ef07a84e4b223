use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Speaker roles and filtered terms
    #[serde(default)]
    pub roles: RoleConfig,

    /// Transcription service settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Audio extraction and video output settings
    #[serde(default)]
    pub media: MediaConfig,

    /// Styled subtitle appearance
    #[serde(default)]
    pub style: SubtitleStyleConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// The two speakers and the blacklist of terms that must never be output.
///
/// Read-only for the duration of a run. Used both to build the transcription
/// prompt and to classify the returned cues.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoleConfig {
    // @field: Role A name as spoken in the source audio
    #[serde(default = "default_role_a_name")]
    pub role_a_name: String,

    // @field: Role A label used in the translated output
    #[serde(default = "default_role_a_label")]
    pub role_a_label: String,

    // @field: Role B name as spoken in the source audio
    #[serde(default = "default_role_b_name")]
    pub role_b_name: String,

    // @field: Role B label used in the translated output
    #[serde(default = "default_role_b_label")]
    pub role_b_label: String,

    // @field: Extra substrings that also mark role A
    #[serde(default = "default_role_a_aliases")]
    pub role_a_aliases: Vec<String>,

    // @field: Extra substrings that also mark role B
    #[serde(default = "default_role_b_aliases")]
    pub role_b_aliases: Vec<String>,

    // @field: Terms the transcription must never output verbatim
    #[serde(default = "default_blacklist_terms")]
    pub blacklist_terms: Vec<String>,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            role_a_name: default_role_a_name(),
            role_a_label: default_role_a_label(),
            role_b_name: default_role_b_name(),
            role_b_label: default_role_b_label(),
            role_a_aliases: default_role_a_aliases(),
            role_b_aliases: default_role_b_aliases(),
            blacklist_terms: default_blacklist_terms(),
        }
    }
}

impl RoleConfig {
    /// Replace the blacklist with terms parsed from a comma separated list.
    ///
    /// Empty items are dropped and duplicates keep their first position.
    pub fn with_blacklist_str(mut self, list: &str) -> Self {
        self.blacklist_terms = parse_term_list(list);
        self
    }

    /// Blacklist with blanks removed and duplicates collapsed, in original order
    pub fn normalized_blacklist(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::with_capacity(self.blacklist_terms.len());
        for term in &self.blacklist_terms {
            let term = term.trim();
            if !term.is_empty() && !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }
        terms
    }
}

/// Split a comma separated list into trimmed, non-empty, de-duplicated terms
pub fn parse_term_list(list: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for item in list.split(',') {
        let item = item.trim();
        if !item.is_empty() && !terms.iter().any(|t| t == item) {
            terms.push(item.to_string());
        }
    }
    terms
}

/// How to style a cue that mentions both speakers
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Role A wins, matching the first-match rule order
    #[default]
    PreferRoleA,
    /// Role B wins
    PreferRoleB,
    /// Fall back to the default style
    Neutral,
}

/// A fixed source-to-target phrase mapping given to the model
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TermMapping {
    pub source: String,
    pub target: String,
}

impl TermMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Transcription service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Models to try, in priority order
    #[serde(default = "default_candidate_models")]
    pub candidate_models: Vec<String>,

    /// Ask the service which models are available and put the best match first
    #[serde(default = "default_true")]
    pub discover_models: bool,

    /// Model family substring used during discovery (e.g. "flash")
    #[serde(default = "default_model_family")]
    pub model_family: String,

    /// Attempts per candidate model for retryable failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base in milliseconds, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds for the generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between polls of the remote file state
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of polls before giving up on remote processing
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Tone directive included in the prompt
    #[serde(default = "default_tone")]
    pub tone: String,

    /// Fixed idiom mappings included in the prompt
    #[serde(default = "default_terminology")]
    pub terminology: Vec<TermMapping>,

    /// How to style cues that mention both speakers
    #[serde(default)]
    pub ambiguity_policy: AmbiguityPolicy,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            candidate_models: default_candidate_models(),
            discover_models: true,
            model_family: default_model_family(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            target_language: default_target_language(),
            tone: default_tone(),
            terminology: default_terminology(),
            ambiguity_policy: AmbiguityPolicy::default(),
        }
    }
}

impl TranscriptionConfig {
    /// Model used when discovery fails or returns nothing
    pub fn fallback_model(&self) -> String {
        self.candidate_models
            .first()
            .cloned()
            .unwrap_or_else(|| default_candidate_models().remove(0))
    }
}

/// What to do with the source video once the styled subtitles exist
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoOutputMode {
    /// Only write subtitle files
    #[default]
    None,
    /// Mux the styled subtitles as a selectable track (MKV)
    Soft,
    /// Burn the styled subtitles into the frames (MP4)
    Burn,
}

impl VideoOutputMode {
    // @returns: Lowercase mode identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Soft => "soft",
            Self::Burn => "burn",
        }
    }
}

impl std::fmt::Display for VideoOutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Media tool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    /// Path or name of the ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Audio sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Audio channel count
    #[serde(default = "default_channels")]
    pub channels: u32,

    /// Audio bitrate in kbps (32 to 48)
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,

    /// Timeout for a single ffmpeg invocation
    #[serde(default = "default_media_timeout_secs")]
    pub timeout_secs: u64,

    /// Video output mode
    #[serde(default)]
    pub video_mode: VideoOutputMode,

    /// Fonts directory handed to libass when burning in
    #[serde(default)]
    pub fonts_dir: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            bitrate_kbps: default_bitrate_kbps(),
            timeout_secs: default_media_timeout_secs(),
            video_mode: VideoOutputMode::default(),
            fonts_dir: None,
        }
    }
}

/// Appearance of the styled subtitle document
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleStyleConfig {
    #[serde(default = "default_font_name")]
    pub font_name: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_play_res_x")]
    pub play_res_x: u32,

    #[serde(default = "default_play_res_y")]
    pub play_res_y: u32,

    #[serde(default = "default_margin_h")]
    pub margin_l: u32,

    #[serde(default = "default_margin_h")]
    pub margin_r: u32,

    #[serde(default = "default_margin_v")]
    pub margin_v: u32,
}

impl Default for SubtitleStyleConfig {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            font_size: default_font_size(),
            play_res_x: default_play_res_x(),
            play_res_y: default_play_res_y(),
            margin_l: default_margin_h(),
            margin_r: default_margin_h(),
            margin_v: default_margin_v(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_role_a_name() -> String {
    "LingLing".to_string()
}

fn default_role_a_label() -> String {
    "Ling姐".to_string()
}

fn default_role_b_name() -> String {
    "Orm".to_string()
}

fn default_role_b_label() -> String {
    "Orm".to_string()
}

fn default_role_a_aliases() -> Vec<String> {
    vec!["Ling".to_string()]
}

fn default_role_b_aliases() -> Vec<String> {
    vec!["Orm".to_string()]
}

fn default_blacklist_terms() -> Vec<String> {
    parse_term_list("迪哥,妈妈达,迪桑达,条纹,时髦,鲁尼特,字幕组")
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_candidate_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-flash-latest".to_string(),
        "gemini-1.5-pro".to_string(),
    ]
}

fn default_model_family() -> String {
    "flash".to_string()
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    5000 // multiplied by the attempt number
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_polls() -> u32 {
    600
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_tone() -> String {
    "Casual, sweet, close relationship (CP fans perspective).".to_string()
}

fn default_terminology() -> Vec<TermMapping> {
    vec![
        TermMapping::new("Phi Ling", "Ling姐"),
        TermMapping::new("Na rak", "好可爱"),
    ]
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_channels() -> u32 {
    1
}

fn default_bitrate_kbps() -> u32 {
    32
}

fn default_media_timeout_secs() -> u64 {
    1800
}

fn default_font_name() -> String {
    "Microsoft YaHei".to_string()
}

fn default_font_size() -> u32 {
    60
}

fn default_play_res_x() -> u32 {
    1920
}

fn default_play_res_y() -> u32 {
    1080
}

fn default_margin_h() -> u32 {
    20
}

fn default_margin_v() -> u32 {
    40
}

impl Config {

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.transcription.target_language)?;

        if self.transcription.api_key.trim().is_empty() {
            return Err(anyhow!(
                "Transcription API key is required (set it in the config, --api-key or GOOGLE_API_KEY)"
            ));
        }

        url::Url::parse(&self.transcription.endpoint)
            .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", self.transcription.endpoint, e))?;

        if self.transcription.candidate_models.is_empty() && !self.transcription.discover_models {
            return Err(anyhow!("At least one candidate model is required when discovery is disabled"));
        }

        if self.transcription.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }

        if !(32..=48).contains(&self.media.bitrate_kbps) {
            return Err(anyhow!(
                "Audio bitrate must be between 32 and 48 kbps, got {}",
                self.media.bitrate_kbps
            ));
        }

        self.validate_roles()
    }

    /// Validate only what styling an existing subtitle file needs
    pub fn validate_roles(&self) -> Result<()> {
        if self.roles.role_a_label.trim().is_empty() || self.roles.role_b_label.trim().is_empty() {
            return Err(anyhow!("Both role labels must be non-empty"));
        }
        Ok(())
    }
}
