use std::fmt;
use std::fmt::Write as _;

use crate::app_config::SubtitleStyleConfig;
use crate::styling::StyleName;
use crate::subtitle_processor::Cue;

// @module: Styled (ASS) document rendering

const SCRIPT_TITLE: &str = "lingsub";
const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

// Colours are &HAABBGGRR
const WHITE: &str = "&H00FFFFFF";
const BLUE: &str = "&H00FFB060";
const PINK: &str = "&H00B469FF";
const OUTLINE: &str = "&H00000000";
const SHADOW: &str = "&H64000000";

/// One named visual style
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: StyleName,
    pub font_name: String,
    pub font_size: u32,
    pub primary_colour: &'static str,
    pub outline_colour: &'static str,
    pub back_colour: &'static str,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

impl Style {
    fn from_config(name: StyleName, primary_colour: &'static str, config: &SubtitleStyleConfig) -> Self {
        Self {
            name,
            // A comma would split the style line
            font_name: config.font_name.replace(',', " "),
            font_size: config.font_size,
            primary_colour,
            outline_colour: OUTLINE,
            back_colour: SHADOW,
            margin_l: config.margin_l,
            margin_r: config.margin_r,
            margin_v: config.margin_v,
        }
    }

    /// The three styles every document declares
    pub fn standard_set(config: &SubtitleStyleConfig) -> [Style; 3] {
        [
            Self::from_config(StyleName::Default, WHITE, config),
            Self::from_config(StyleName::RoleA, BLUE, config),
            Self::from_config(StyleName::RoleB, PINK, config),
        ]
    }

    /// Render as a `Style:` line (bottom centre, outline 2, shadow 1)
    pub fn to_line(&self) -> String {
        format!(
            "Style: {},{},{},{},&H000000FF,{},{},0,0,0,0,100,100,0,0,1,2,1,2,{},{},{},1",
            self.name,
            self.font_name,
            self.font_size,
            self.primary_colour,
            self.outline_colour,
            self.back_colour,
            self.margin_l,
            self.margin_r,
            self.margin_v,
        )
    }
}

/// A rendered styled document: header plus one dialogue line per cue
#[derive(Debug, Clone, PartialEq)]
pub struct StyledDocument {
    pub header: String,
    pub events: Vec<String>,
}

impl StyledDocument {
    /// Number of dialogue lines in the body
    pub fn dialogue_count(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for StyledDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.header)?;
        for event in &self.events {
            writeln!(f, "{}", event)?;
        }
        Ok(())
    }
}

/// Renders classified cues into a styled document
#[derive(Debug, Clone)]
pub struct AssRenderer {
    play_res_x: u32,
    play_res_y: u32,
    styles: [Style; 3],
}

impl AssRenderer {
    pub fn new(config: &SubtitleStyleConfig) -> Self {
        Self {
            play_res_x: config.play_res_x,
            play_res_y: config.play_res_y,
            styles: Style::standard_set(config),
        }
    }

    pub fn styles(&self) -> &[Style; 3] {
        &self.styles
    }

    /// Script info, style table and the events format line
    pub fn header(&self) -> String {
        let mut header = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(header, "[Script Info]");
        let _ = writeln!(header, "Title: {}", SCRIPT_TITLE);
        let _ = writeln!(header, "ScriptType: v4.00+");
        let _ = writeln!(header, "PlayResX: {}", self.play_res_x);
        let _ = writeln!(header, "PlayResY: {}", self.play_res_y);
        let _ = writeln!(header, "WrapStyle: 0");
        let _ = writeln!(header, "ScaledBorderAndShadow: yes");
        let _ = writeln!(header);
        let _ = writeln!(header, "[V4+ Styles]");
        let _ = writeln!(header, "{}", STYLE_FORMAT);
        for style in &self.styles {
            let _ = writeln!(header, "{}", style.to_line());
        }
        let _ = writeln!(header);
        let _ = writeln!(header, "[Events]");
        let _ = writeln!(header, "{}", EVENT_FORMAT);
        header
    }

    /// Render a single dialogue line. The text is not escaped.
    pub fn dialogue_line(cue: &Cue, style: StyleName) -> String {
        format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            cue.display_start(),
            cue.display_end(),
            style,
            cue.text
        )
    }

    pub fn render(&self, cues: &[(Cue, StyleName)]) -> StyledDocument {
        StyledDocument {
            header: self.header(),
            events: cues
                .iter()
                .map(|(cue, style)| Self::dialogue_line(cue, *style))
                .collect(),
        }
    }
}

impl Default for AssRenderer {
    fn default() -> Self {
        Self::new(&SubtitleStyleConfig::default())
    }
}
