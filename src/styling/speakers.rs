/*!
 * Speaker classification for styled subtitles.
 *
 * The transcription prompt asks the model to prefix every line with the
 * speaker's label. This module looks for those labels (and a few aliases) in
 * the cue text to pick a style. It is keyword matching, not diarization: if the
 * model ignores the labelling rule, cues fall back to the default style.
 */

use crate::app_config::{AmbiguityPolicy, RoleConfig};
use crate::styling::StyleName;

/// Outcome of matching a cue's text against the two roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    RoleA,
    RoleB,
    /// Neither role matched
    Default,
    /// Both roles matched
    Ambiguous,
}

impl Speaker {
    /// Pick a style, settling ambiguous cues with the given policy
    pub fn resolve(self, policy: AmbiguityPolicy) -> StyleName {
        match self {
            Self::RoleA => StyleName::RoleA,
            Self::RoleB => StyleName::RoleB,
            Self::Default => StyleName::Default,
            Self::Ambiguous => match policy {
                AmbiguityPolicy::PreferRoleA => StyleName::RoleA,
                AmbiguityPolicy::PreferRoleB => StyleName::RoleB,
                AmbiguityPolicy::Neutral => StyleName::Default,
            },
        }
    }
}

/// Classify cue text by case-sensitive substring containment.
///
/// Role A matches on its label or any role A alias, role B likewise. Empty
/// labels and aliases never match.
pub fn classify(text: &str, roles: &RoleConfig) -> Speaker {
    let is_a = mentions(text, &roles.role_a_label, &roles.role_a_aliases);
    let is_b = mentions(text, &roles.role_b_label, &roles.role_b_aliases);

    match (is_a, is_b) {
        (true, true) => Speaker::Ambiguous,
        (true, false) => Speaker::RoleA,
        (false, true) => Speaker::RoleB,
        (false, false) => Speaker::Default,
    }
}

/// Classify and resolve in one step
pub fn classify_style(text: &str, roles: &RoleConfig, policy: AmbiguityPolicy) -> StyleName {
    classify(text, roles).resolve(policy)
}

fn mentions(text: &str, label: &str, aliases: &[String]) -> bool {
    std::iter::once(label)
        .chain(aliases.iter().map(String::as_str))
        .any(|needle| !needle.is_empty() && text.contains(needle))
}
