/*!
 * SRT to styled ASS conversion.
 *
 * - `speakers`: Assigns a style to each cue from the speaker label in its text
 * - `ass`: Renders the fixed style table and the dialogue lines
 */

use std::fmt;

use log::debug;

use crate::app_config::{AmbiguityPolicy, RoleConfig, SubtitleStyleConfig};
use crate::subtitle_processor::{parse_cues, Cue};

pub mod ass;
pub mod speakers;

pub use ass::{AssRenderer, Style, StyledDocument};
pub use speakers::{classify, classify_style, Speaker};

/// Identity of one of the three fixed styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    Default,
    RoleA,
    RoleB,
}

impl StyleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::RoleA => "RoleA",
            Self::RoleB => "RoleB",
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attach a style to every cue
pub fn classify_cues(cues: Vec<Cue>, roles: &RoleConfig, policy: AmbiguityPolicy) -> Vec<(Cue, StyleName)> {
    cues.into_iter()
        .map(|cue| {
            let speaker = classify(&cue.text, roles);
            if speaker == Speaker::Ambiguous {
                debug!("Cue {} mentions both speakers, resolving with {:?}", cue.seq_num, policy);
            }
            let style = speaker.resolve(policy);
            (cue, style)
        })
        .collect()
}

/// Parse raw SRT text, classify each cue and render the styled document
pub fn convert_srt_to_ass(
    raw_srt: &str,
    roles: &RoleConfig,
    policy: AmbiguityPolicy,
    style: &SubtitleStyleConfig,
) -> StyledDocument {
    let classified = classify_cues(parse_cues(raw_srt), roles, policy);
    AssRenderer::new(style).render(&classified)
}
