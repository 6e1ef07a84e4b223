use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use std::path::Path;
use log::debug;

// @module: Subtitle cue parsing and time code conversion

// @const: Blank line separating SRT blocks
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n\s*").unwrap()
});

// @const: Separator between start and end on the time line
pub const TIME_RANGE_SEPARATOR: &str = " --> ";

/// Display timestamp used when a raw time code cannot be read
pub const FALLBACK_DISPLAY_TIMESTAMP: &str = "0:00:00.00";

/// Convert an SRT time code (`HH:MM:SS,mmm`) into the styled-document form
/// (`H:MM:SS.cc`).
///
/// The hour loses its zero padding, minutes and seconds are copied as written and
/// the milliseconds are truncated to centiseconds. Malformed input yields
/// [`FALLBACK_DISPLAY_TIMESTAMP`] so that one bad cue never aborts a document;
/// use [`Timestamp::parse_srt`] where strict validation is wanted.
pub fn to_display_timestamp(raw: &str) -> String {
    convert_time_code(raw.trim()).unwrap_or_else(|| FALLBACK_DISPLAY_TIMESTAMP.to_string())
}

fn convert_time_code(raw: &str) -> Option<String> {
    let mut fields = raw.split(':');
    let (hours, minutes, rest) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }
    let (seconds, millis) = rest.split_once(',')?;

    if ![hours, minutes, seconds, millis].iter().all(|f| is_digits(f)) || millis.len() < 2 {
        return None;
    }
    let hours: u64 = hours.parse().ok()?;

    Some(format!("{}:{}:{}.{}", hours, minutes, seconds, &millis[..2]))
}

fn is_digits(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

/// A position in the media, stored in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp {
    pub millis: u64,
}

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Strictly parse `HH:MM:SS,mmm`
    pub fn parse_srt(value: &str) -> Result<Self> {
        let (clock, millis) = value.trim().split_once(',')
            .ok_or_else(|| anyhow!("Invalid SRT timestamp: {}", value))?;
        let millis: u64 = parse_field(millis, 3, value).context("Failed to parse milliseconds")?;
        let (h, m, s) = parse_clock(clock, value)?;
        Ok(Self::from_millis(clock_to_millis(h, m, s, millis, value)?))
    }

    /// Strictly parse `H:MM:SS.cc`
    pub fn parse_ass(value: &str) -> Result<Self> {
        let (clock, centis) = value.trim().split_once('.')
            .ok_or_else(|| anyhow!("Invalid ASS timestamp: {}", value))?;
        let centis: u64 = parse_field(centis, 2, value).context("Failed to parse centiseconds")?;
        let (h, m, s) = parse_clock(clock, value)?;
        Ok(Self::from_millis(clock_to_millis(h, m, s, centis * 10, value)?))
    }

    /// Format as `HH:MM:SS,mmm`
    pub fn to_srt(&self) -> String {
        let (h, m, s) = self.clock();
        format!("{:02}:{:02}:{:02},{:03}", h, m, s, self.millis % 1000)
    }

    /// Format as `H:MM:SS.cc`, truncating to centiseconds
    pub fn to_ass(&self) -> String {
        let (h, m, s) = self.clock();
        format!("{}:{:02}:{:02}.{:02}", h, m, s, (self.millis % 1000) / 10)
    }

    fn clock(&self) -> (u64, u64, u64) {
        let total_secs = self.millis / 1000;
        (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60)
    }
}

fn parse_field(field: &str, width: usize, whole: &str) -> Result<u64> {
    if field.len() != width || !is_digits(field) {
        return Err(anyhow!("Invalid time field '{}' in {}", field, whole));
    }
    Ok(field.parse()?)
}

fn clock_to_millis(hours: u64, minutes: u64, seconds: u64, millis: u64, whole: &str) -> Result<u64> {
    hours.checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
        .and_then(|secs| secs.checked_mul(1000))
        .and_then(|total| total.checked_add(millis))
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", whole))
}

fn parse_clock(clock: &str, whole: &str) -> Result<(u64, u64, u64)> {
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 || !is_digits(parts[0]) {
        return Err(anyhow!("Invalid clock in timestamp: {}", whole));
    }
    let hours: u64 = parts[0].parse()?;
    let minutes = parse_field(parts[1], 2, whole)?;
    let seconds = parse_field(parts[2], 2, whole)?;
    if minutes >= 60 || seconds >= 60 {
        return Err(anyhow!("Invalid time components in timestamp: {}", whole));
    }
    Ok((hours, minutes, seconds))
}

// @struct: One timed subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Sequence number, regenerated on parse
    pub seq_num: usize,

    // @field: Start time code as written in the source
    pub start: String,

    // @field: End time code as written in the source
    pub end: String,

    // @field: Cue text on a single line
    pub text: String,
}

impl Cue {
    pub fn new(seq_num: usize, start: impl Into<String>, end: impl Into<String>, text: impl Into<String>) -> Self {
        Cue {
            seq_num,
            start: start.into(),
            end: end.into(),
            text: text.into(),
        }
    }

    /// Start time in styled-document form
    pub fn display_start(&self) -> String {
        to_display_timestamp(&self.start)
    }

    /// End time in styled-document form
    pub fn display_end(&self) -> String {
        to_display_timestamp(&self.end)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{}{}{}", self.start, TIME_RANGE_SEPARATOR, self.end)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Split raw SRT text into cues.
///
/// Blocks with fewer than three lines, without a `" --> "` time line, or with
/// blank text are skipped. Multi-line text is joined with single spaces and the
/// input order is kept as is.
pub fn parse_cues(raw: &str) -> Vec<Cue> {
    let normalized = raw.replace("\r\n", "\n");
    let mut cues = Vec::new();

    for (block_index, block) in BLOCK_SEPARATOR.split(normalized.trim()).enumerate() {
        let lines: Vec<&str> = block.lines().map(str::trim).collect();
        if lines.len() < 3 {
            debug!("Skipping block {}: expected at least 3 lines, found {}", block_index + 1, lines.len());
            continue;
        }

        let Some((start, end)) = lines[1].split_once(TIME_RANGE_SEPARATOR) else {
            debug!("Skipping block {}: no time range on line 2", block_index + 1);
            continue;
        };

        let text = lines[2..]
            .iter()
            .filter(|line| !line.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            debug!("Skipping block {}: empty text", block_index + 1);
            continue;
        }

        cues.push(Cue::new(cues.len() + 1, start.trim(), end.trim(), text));
    }

    cues
}

/// Render cues back to SRT text
pub fn render_srt(cues: &[Cue]) -> String {
    cues.iter().map(|cue| cue.to_string()).collect()
}

/// Read and parse an SRT file
pub fn parse_srt_file(path: &Path) -> Result<Vec<Cue>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
    Ok(parse_cues(&content))
}
