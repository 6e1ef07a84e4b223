// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use lingsub::app_config::{self, Config, VideoOutputMode};
use lingsub::app_controller::Controller;
use lingsub::file_utils::{FileManager, FileType};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for VideoOutputMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliVideoMode {
    None,
    Soft,
    Burn,
}

impl From<CliVideoMode> for VideoOutputMode {
    fn from(mode: CliVideoMode) -> Self {
        match mode {
            CliVideoMode::None => VideoOutputMode::None,
            CliVideoMode::Soft => VideoOutputMode::Soft,
            CliVideoMode::Burn => VideoOutputMode::Burn,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe media into styled bilingual subtitles (default command)
    Transcribe(TranscribeArgs),

    /// Convert an existing SRT file into styled ASS subtitles
    Style(StyleArgs),

    /// Generate shell completions for lingsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every processing command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Directory for the outputs (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct TranscribeArgs {
    /// Input media file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    common: CommonArgs,

    /// Model tried before the configured candidates
    #[arg(short, long)]
    model: Option<String>,

    /// What to do with the video after styling
    #[arg(short, long, value_enum)]
    video_mode: Option<CliVideoMode>,

    /// API key for the transcription service
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct StyleArgs {
    /// Input SRT file
    #[arg(value_name = "SRT_FILE")]
    input_path: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

/// lingsub - styled bilingual subtitles for two-speaker videos
///
/// Transcribes and translates the dialogue of a video with a hosted generative
/// model, then colors every line by speaker in an ASS subtitle file.
#[derive(Parser, Debug)]
#[command(name = "lingsub")]
#[command(version)]
#[command(about = "Speaker-styled subtitle generation with Gemini")]
#[command(long_about = "lingsub extracts the audio of a video, has Gemini transcribe and translate it \
into SRT with speaker labels, and renders speaker-colored ASS subtitles.

EXAMPLES:
    lingsub episode.mp4                          # Transcribe using default config
    lingsub -f episode.mp4                       # Force overwrite existing files
    lingsub -m gemini-2.0-flash episode.mp4      # Try a specific model first
    lingsub --video-mode soft episode.mp4        # Also mux the subtitles into an MKV
    lingsub style episode.srt                    # Style an existing SRT only
    lingsub --log-level debug /videos/           # Process an entire directory
    lingsub completions bash > lingsub.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key may also come from GOOGLE_API_KEY
    or GEMINI_API_KEY.

OUTPUTS:
    <name>.srt         raw subtitles from the model
    <name>.ass         speaker-styled subtitles
    <name>.soft.mkv    video with a selectable subtitle track (--video-mode soft)
    <name>.burned.mp4  video with burned-in subtitles (--video-mode burn)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input media file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,

    /// Model tried before the configured candidates
    #[arg(short, long)]
    model: Option<String>,

    /// What to do with the video after styling
    #[arg(short, long, value_enum)]
    video_mode: Option<CliVideoMode>,

    /// API key for the transcription service
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the logger's ceiling; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lingsub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Transcribe(args)) => run_transcribe(args).await,
        Some(Commands::Style(args)) => run_style(args),
        None => {
            // Default behavior - top-level args act as `transcribe`
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let args = TranscribeArgs {
                input_path,
                common: cli.common,
                model: cli.model,
                video_mode: cli.video_mode,
                api_key: cli.api_key,
            };
            run_transcribe(args).await
        }
    }
}

/// Load the config file, or write a default one when it is missing
fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(cmd_log_level) = &common.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let config_path = &common.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    match &common.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(level_filter(&config.log_level)),
    }

    Ok(config)
}

fn output_dir_for(input_path: &Path, common: &CommonArgs) -> PathBuf {
    common.output_dir.clone().unwrap_or_else(|| {
        input_path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf()
    })
}

async fn run_transcribe(options: TranscribeArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;

    if let Some(api_key) = options.api_key.clone().or_else(|| std::env::var("GEMINI_API_KEY").ok()) {
        config.transcription.api_key = api_key;
    }

    if let Some(model) = &options.model {
        config.transcription.candidate_models.insert(0, model.clone());
        config.transcription.discover_models = false;
    }

    if let Some(mode) = &options.video_mode {
        config.media.video_mode = mode.clone().into();
    }

    // Styling an SRT needs no service access
    let styling_only = FileManager::detect_file_type(&options.input_path) == FileType::Subtitle;
    let validation = if styling_only { config.validate_roles() } else { config.validate() };
    validation.context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let force_overwrite = options.common.force_overwrite;

    if options.input_path.is_file() {
        let output_dir = output_dir_for(&options.input_path, &options.common);
        let artifacts = controller.run(options.input_path.clone(), output_dir, force_overwrite).await?;
        if let Some(styled) = artifacts.styled_subtitles {
            info!("Success: {}", styled.display());
        }
    } else if options.input_path.is_dir() {
        if options.common.output_dir.is_some() {
            warn!("--output-dir is ignored in folder mode; outputs are written next to each input");
        }
        controller.run_folder(options.input_path.clone(), force_overwrite).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn run_style(options: StyleArgs) -> Result<()> {
    let config = load_config(&options.common)?;
    config.validate_roles().context("Configuration validation failed")?;

    if FileManager::detect_file_type(&options.input_path) != FileType::Subtitle {
        return Err(anyhow!("Expected an .srt file, got {:?}", options.input_path));
    }

    let controller = Controller::with_config(config)?;
    let output_dir = output_dir_for(&options.input_path, &options.common);
    let artifacts = controller.style_only(&options.input_path, &output_dir, options.common.force_overwrite)?;

    if let Some(styled) = artifacts.styled_subtitles {
        info!("Success: {}", styled.display());
    }

    Ok(())
}
