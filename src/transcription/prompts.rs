/*!
 * Transcription prompt construction.
 *
 * The prompt is a contract with the rest of the pipeline: the parser expects
 * plain SRT and the speaker classifier expects every line to begin with one of
 * the configured labels.
 */

use std::fmt::Write as _;

use crate::app_config::{RoleConfig, TermMapping};

/// Settings that shape the prompt beyond the roles
#[derive(Debug, Clone, PartialEq)]
pub struct PromptOptions {
    /// Target language name as it should appear in the prompt
    pub target_language: String,
    /// Tone directive
    pub tone: String,
    /// Fixed idiom mappings
    pub terminology: Vec<TermMapping>,
}

/// Build the instruction text sent along with the audio
pub fn build_prompt(roles: &RoleConfig, options: &PromptOptions) -> String {
    let mut prompt = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        prompt,
        "Task: Transcribe and translate the audio into {} subtitles in SRT format.",
        options.target_language
    );
    let _ = writeln!(
        prompt,
        "Context: A conversation between two people, {} and {}.",
        roles.role_a_name, roles.role_b_name
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Rules:");
    let _ = writeln!(
        prompt,
        "1. Output format: strict SRT only. Each entry is an index line, a time line \
         \"HH:MM:SS,mmm --> HH:MM:SS,mmm\" and the text, separated by a blank line. \
         Do not wrap the output in markdown code fences and do not add any commentary."
    );
    let _ = writeln!(
        prompt,
        "2. Speaker identification: every subtitle line must start with \"{}: \" or \"{}: \".",
        roles.role_a_label, roles.role_b_label
    );
    let _ = writeln!(prompt, "3. Terminology:");
    for mapping in terminology_table(roles, &options.terminology) {
        let _ = writeln!(prompt, "   - \"{}\" -> \"{}\"", mapping.source, mapping.target);
    }
    let _ = writeln!(prompt, "4. Tone: {}", options.tone);

    let blacklist = roles.normalized_blacklist();
    if blacklist.is_empty() {
        let _ = writeln!(prompt, "5. Filter: ignore background music and noise.");
    } else {
        let _ = writeln!(
            prompt,
            "5. Filter: ignore background music and noise. Never output any of these terms \
             (they are misheard noise, channel branding or watermarks): {}",
            blacklist.join(", ")
        );
    }

    prompt
}

/// Fixed idioms followed by the two speaker name mappings
pub fn terminology_table(roles: &RoleConfig, idioms: &[TermMapping]) -> Vec<TermMapping> {
    idioms.iter()
        .cloned()
        .chain([
            TermMapping::new(roles.role_a_name.clone(), roles.role_a_label.clone()),
            TermMapping::new(roles.role_b_name.clone(), roles.role_b_label.clone()),
        ])
        .collect()
}

/// Strip a markdown code fence wrapped around the model output, then trim
pub fn clean_model_output(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the info string (e.g. "srt") on the opening fence line
        let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body);
        return body.trim().to_string();
    }
    trimmed.to_string()
}
