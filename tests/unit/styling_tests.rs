/*!
 * Tests for speaker classification and the styled document
 */

use lingsub::app_config::{AmbiguityPolicy, RoleConfig, SubtitleStyleConfig};
use lingsub::styling::{AssRenderer, Speaker, StyleName, classify, classify_cues, classify_style};
use lingsub::subtitle_processor::Cue;

#[test]
fn test_classify_withDefaultRoles_shouldFollowLabels() {
    let roles = RoleConfig::default();

    assert_eq!(classify("Ling姐: hello", &roles), Speaker::RoleA);
    assert_eq!(classify("Orm: hi", &roles), Speaker::RoleB);
    assert_eq!(classify("(music)", &roles), Speaker::Default);
    assert_eq!(classify("Ling姐: Orm, come here", &roles), Speaker::Ambiguous);
}

#[test]
fn test_classify_withAliasOnly_shouldMatchRole() {
    let roles = RoleConfig::default();

    // "Ling" is an alias of role A even without the localized label
    assert_eq!(classify("Ling is here", &roles), Speaker::RoleA);
    assert_eq!(classify("orm: lowercase", &roles), Speaker::Default);
}

#[test]
fn test_classifyStyle_withAmbiguousText_shouldFollowPolicy() {
    let roles = RoleConfig::default();
    let text = "Orm: thank you Ling姐";

    assert_eq!(classify_style(text, &roles, AmbiguityPolicy::PreferRoleA), StyleName::RoleA);
    assert_eq!(classify_style(text, &roles, AmbiguityPolicy::PreferRoleB), StyleName::RoleB);
    assert_eq!(classify_style(text, &roles, AmbiguityPolicy::Neutral), StyleName::Default);
    assert_eq!(AmbiguityPolicy::default(), AmbiguityPolicy::PreferRoleA);
}

#[test]
fn test_classify_withCustomRoles_shouldUseConfiguredNames() {
    let roles = RoleConfig {
        role_a_name: "Freen".to_string(),
        role_a_label: "Freen".to_string(),
        role_b_name: "Becky".to_string(),
        role_b_label: "Becky".to_string(),
        role_a_aliases: Vec::new(),
        role_b_aliases: Vec::new(),
        ..RoleConfig::default()
    };

    assert_eq!(classify("Becky: hi", &roles), Speaker::RoleB);
    assert_eq!(classify("Ling姐: hi", &roles), Speaker::Default);
}

#[test]
fn test_classifyCues_shouldKeepOrderAndPairStyles() {
    let cues = vec![
        Cue::new(1, "00:00:01,000", "00:00:02,000", "Orm: first"),
        Cue::new(2, "00:00:02,000", "00:00:03,000", "nobody"),
        Cue::new(3, "00:00:03,000", "00:00:04,000", "Ling姐: last"),
    ];

    let classified = classify_cues(cues, &RoleConfig::default(), AmbiguityPolicy::PreferRoleA);
    let styles: Vec<StyleName> = classified.iter().map(|(_, s)| *s).collect();

    assert_eq!(styles, [StyleName::RoleB, StyleName::Default, StyleName::RoleA]);
    assert_eq!(classified[2].0.seq_num, 3);
}

#[test]
fn test_dialogueLine_withCommaInText_shouldNotEscape() {
    let cue = Cue::new(1, "00:00:01,000", "00:00:02,500", "Ling姐: well, yes");

    let line = AssRenderer::dialogue_line(&cue, StyleName::RoleA);

    assert_eq!(line, "Dialogue: 0,0:00:01.00,0:00:02.50,RoleA,,0,0,0,,Ling姐: well, yes");
}

#[test]
fn test_render_withCustomStyle_shouldUseConfiguredFontAndResolution() {
    let style = SubtitleStyleConfig {
        font_name: "Noto Sans CJK SC".to_string(),
        font_size: 48,
        play_res_x: 1280,
        play_res_y: 720,
        ..SubtitleStyleConfig::default()
    };

    let document = AssRenderer::new(&style).render(&[]);
    let text = document.to_string();

    assert_eq!(document.dialogue_count(), 0);
    assert!(text.starts_with("[Script Info]\nTitle: lingsub\n"));
    assert!(text.contains("PlayResX: 1280\nPlayResY: 720\n"));
    assert!(text.contains("Style: RoleB,Noto Sans CJK SC,48,&H00B469FF,"));
    assert!(text.contains("[V4+ Styles]"));
    assert!(text.trim_end().ends_with("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"));
}

#[test]
fn test_styles_shouldHaveDistinctPrimaryColours() {
    let renderer = AssRenderer::default();
    let [default, role_a, role_b] = renderer.styles();

    assert_eq!(default.name, StyleName::Default);
    assert_ne!(default.primary_colour, role_a.primary_colour);
    assert_ne!(role_a.primary_colour, role_b.primary_colour);
}
