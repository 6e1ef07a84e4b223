/*!
 * Tests for application configuration functionality
 */

use lingsub::app_config::{
    AmbiguityPolicy, Config, LogLevel, RoleConfig, VideoOutputMode, parse_term_list,
};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.roles.role_a_name, "LingLing");
    assert_eq!(config.roles.role_a_label, "Ling姐");
    assert_eq!(config.roles.role_b_name, "Orm");
    assert_eq!(config.roles.role_b_label, "Orm");
    assert_eq!(config.roles.role_a_aliases, vec!["Ling"]);
    assert_eq!(config.roles.role_b_aliases, vec!["Orm"]);
    assert_eq!(config.roles.blacklist_terms.len(), 7);

    assert_eq!(config.transcription.endpoint, "https://generativelanguage.googleapis.com");
    assert_eq!(config.transcription.candidate_models[0], "gemini-1.5-flash");
    assert_eq!(config.transcription.retry_count, 3);
    assert_eq!(config.transcription.timeout_secs, 600);
    assert_eq!(config.transcription.poll_interval_ms, 1000);
    assert_eq!(config.transcription.target_language, "zh");
    assert_eq!(config.transcription.ambiguity_policy, AmbiguityPolicy::PreferRoleA);

    assert_eq!(config.media.sample_rate, 16_000);
    assert_eq!(config.media.channels, 1);
    assert_eq!(config.media.bitrate_kbps, 32);
    assert_eq!(config.media.video_mode, VideoOutputMode::None);

    assert_eq!(config.style.font_size, 60);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = common::fast_config();
    assert!(config.validate().is_ok());

    // Missing API key
    config.transcription.api_key = "  ".to_string();
    assert!(config.validate().is_err());
    config.transcription.api_key = "key".to_string();

    // Invalid target language
    config.transcription.target_language = "xx".to_string();
    assert!(config.validate().is_err());
    config.transcription.target_language = "th".to_string();
    assert!(config.validate().is_ok());

    // Bitrate outside 32..=48
    config.media.bitrate_kbps = 64;
    assert!(config.validate().is_err());
    config.media.bitrate_kbps = 48;
    assert!(config.validate().is_ok());

    // Endpoint must be a URL
    config.transcription.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.transcription.endpoint = "http://localhost:8080".to_string();

    // Empty candidates only allowed with discovery
    config.transcription.candidate_models.clear();
    assert!(config.validate().is_ok());
    config.transcription.discover_models = false;
    assert!(config.validate().is_err());
}

#[test]
fn test_validateRoles_withEmptyLabel_shouldFail() {
    let mut config = Config::default();
    assert!(config.validate_roles().is_ok());

    config.roles.role_b_label = String::new();
    assert!(config.validate_roles().is_err());
}

#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "transcription": { "api_key": "abc", "ambiguity_policy": "neutral" },
        "media": { "video_mode": "soft" },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.transcription.api_key, "abc");
    assert_eq!(config.transcription.ambiguity_policy, AmbiguityPolicy::Neutral);
    assert_eq!(config.transcription.retry_count, 3);
    assert_eq!(config.media.video_mode, VideoOutputMode::Soft);
    assert_eq!(config.media.ffmpeg_path, "ffmpeg");
    assert_eq!(config.roles, RoleConfig::default());
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_config_serialize_shouldRoundTripThroughJson() {
    let config = common::fast_config();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.transcription.api_key, "test-key");
    assert_eq!(parsed.transcription.terminology, config.transcription.terminology);
}

#[test]
fn test_parseTermList_shouldTrimAndDeduplicate() {
    assert_eq!(parse_term_list(" a, b ,,a, c "), vec!["a", "b", "c"]);
    assert!(parse_term_list("").is_empty());

    let roles = RoleConfig::default().with_blacklist_str("x,x");
    assert_eq!(roles.normalized_blacklist(), vec!["x"]);
}

#[test]
fn test_videoOutputMode_fromJson_shouldAcceptLowercaseModesOnly() {
    assert_eq!(serde_json::from_str::<VideoOutputMode>("\"soft\"").unwrap(), VideoOutputMode::Soft);
    assert_eq!(serde_json::from_str::<VideoOutputMode>("\"burn\"").unwrap(), VideoOutputMode::Burn);
    assert!(serde_json::from_str::<VideoOutputMode>("\"hard\"").is_err());
    assert_eq!(VideoOutputMode::None.to_string(), "none");
}

#[test]
fn test_fallbackModel_withNoCandidates_shouldUseBuiltInDefault() {
    let mut config = Config::default();
    config.transcription.candidate_models = vec!["custom".to_string()];
    assert_eq!(config.transcription.fallback_model(), "custom");

    config.transcription.candidate_models.clear();
    assert_eq!(config.transcription.fallback_model(), "gemini-1.5-flash");
}
