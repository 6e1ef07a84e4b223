/*!
 * Integration tests for controller runs
 */

use anyhow::Result;

use lingsub::app_config::Config;
use lingsub::app_controller::{Controller, FolderSummary};
use lingsub::errors::SubtitleError;
use lingsub::file_utils::FileManager;
use lingsub::providers::mock::MockProvider;
use crate::common;

fn controller_without_ffmpeg() -> Result<Controller> {
    let mut config = common::fast_config();
    config.media.ffmpeg_path = "lingsub-no-such-ffmpeg".to_string();
    Controller::with_config(config)
}

#[test]
fn test_styleOnly_withSrtInput_shouldWriteAssNextToIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let controller = Controller::with_config(Config::default())?;

    let artifacts = controller.style_only(&srt, temp_dir.path(), false)?;

    let styled = artifacts.styled_subtitles.expect("styled output");
    assert_eq!(styled, temp_dir.path().join("episode.ass"));
    assert!(artifacts.raw_subtitles.is_none());
    let content = FileManager::read_to_string(&styled)?;
    assert!(content.contains("Dialogue: 0,0:00:01.00,0:00:03.00,RoleA,,0,0,0,,Ling姐: 你好"));
    Ok(())
}

#[test]
fn test_styleOnly_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let existing = common::create_test_file(temp_dir.path(), "episode.ass", "old")?;
    let controller = Controller::with_config(Config::default())?;

    let skipped = controller.style_only(&srt, temp_dir.path(), false)?;
    assert!(skipped.skipped);
    assert_eq!(FileManager::read_to_string(&existing)?, "old");

    let forced = controller.style_only(&srt, temp_dir.path(), true)?;
    assert!(!forced.skipped);
    assert_ne!(FileManager::read_to_string(&existing)?, "old");
    Ok(())
}

#[test]
fn test_styleOnly_withNoParsableCues_shouldFailWithNoCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_file(temp_dir.path(), "empty.srt", "I could not transcribe this audio.")?;
    let controller = Controller::with_config(Config::default())?;

    let error = controller.style_only(&srt, temp_dir.path(), false).unwrap_err();

    assert!(matches!(error.downcast_ref::<SubtitleError>(), Some(SubtitleError::NoCues(_))));
    assert!(!temp_dir.path().join("empty.ass").exists());
    Ok(())
}

#[tokio::test]
async fn test_runWithProvider_withSrtInput_shouldNotCallProvider() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let out_dir = temp_dir.path().join("out");
    let provider = MockProvider::new();

    let artifacts = controller_without_ffmpeg()?
        .run_with_provider(&provider, &srt, &out_dir, false)
        .await?;

    assert_eq!(artifacts.styled_subtitles, Some(out_dir.join("episode.ass")));
    assert!(provider.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_transcribeAudio_withMockProvider_shouldWriteBothArtifacts() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_file(temp_dir.path(), "work/audio.mp3", "fake audio")?;
    let input = temp_dir.path().join("episode.mp4");
    let out_dir = temp_dir.path().join("out");
    let provider = MockProvider::working("gemini-1.5-flash", common::TWO_SPEAKER_SRT);

    let artifacts = controller_without_ffmpeg()?
        .transcribe_audio(&provider, &audio, &input, &out_dir, false)
        .await?;

    assert_eq!(artifacts.raw_subtitles, Some(out_dir.join("episode.srt")));
    assert_eq!(artifacts.styled_subtitles, Some(out_dir.join("episode.ass")));
    assert_eq!(FileManager::read_to_string(out_dir.join("episode.srt"))?, common::TWO_SPEAKER_SRT.trim());
    let styled = FileManager::read_to_string(out_dir.join("episode.ass"))?;
    assert!(styled.contains(",RoleB,,0,0,0,,Orm: 嗨"));
    Ok(())
}

#[tokio::test]
async fn test_transcribeAudio_withUnparsableOutput_shouldKeepRawText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_file(temp_dir.path(), "audio.mp3", "fake audio")?;
    let input = temp_dir.path().join("episode.mp4");
    let provider = MockProvider::working("gemini-1.5-flash", "Sorry, the audio is silent.");

    let error = controller_without_ffmpeg()?
        .transcribe_audio(&provider, &audio, &input, temp_dir.path(), false)
        .await
        .unwrap_err();

    assert!(matches!(error.downcast_ref::<SubtitleError>(), Some(SubtitleError::NoCues(_))));
    assert_eq!(
        FileManager::read_to_string(temp_dir.path().join("episode.srt"))?,
        "Sorry, the audio is silent."
    );
    assert!(!temp_dir.path().join("episode.ass").exists());
    Ok(())
}

#[tokio::test]
async fn test_transcribeAudio_withUserSrtPresent_shouldKeepItUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio = common::create_test_file(temp_dir.path(), "work/audio.mp3", "fake audio")?;
    let input = temp_dir.path().join("episode.mp4");
    let user_srt = common::create_test_file(temp_dir.path(), "episode.srt", "USER SUBS")?;
    let provider = MockProvider::working("gemini-1.5-flash", common::TWO_SPEAKER_SRT);
    let controller = controller_without_ffmpeg()?;

    let skipped = controller
        .transcribe_audio(&provider, &audio, &input, temp_dir.path(), false)
        .await?;

    assert!(skipped.skipped);
    assert_eq!(FileManager::read_to_string(&user_srt)?, "USER SUBS");
    assert!(provider.calls().is_empty());

    let forced = controller
        .transcribe_audio(&provider, &audio, &input, temp_dir.path(), true)
        .await?;

    assert!(!forced.skipped);
    assert_eq!(FileManager::read_to_string(&user_srt)?, common::TWO_SPEAKER_SRT.trim());
    Ok(())
}

#[tokio::test]
async fn test_runWithProvider_withUserSrtPresent_shouldSkipBeforeExtraction() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "episode.mp4", "video")?;
    let user_srt = common::create_test_file(temp_dir.path(), "episode.srt", "USER SUBS")?;
    let provider = MockProvider::new();

    // ffmpeg is unavailable, so reaching extraction would fail the run
    let artifacts = controller_without_ffmpeg()?
        .run_with_provider(&provider, &video, temp_dir.path(), false)
        .await?;

    assert!(artifacts.skipped);
    assert_eq!(FileManager::read_to_string(&user_srt)?, "USER SUBS");
    Ok(())
}

#[tokio::test]
async fn test_runWithProvider_withFailingExtraction_shouldRemoveWorkDir() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "episode.mp4", "not really a video")?;
    let temp_root = temp_dir.path().join("tmp");
    let provider = MockProvider::working("gemini-1.5-flash", common::TWO_SPEAKER_SRT);

    let controller = controller_without_ffmpeg()?.with_temp_root(&temp_root);
    let result = controller.run_with_provider(&provider, &video, temp_dir.path(), false).await;

    assert!(result.is_err());
    assert!(temp_root.exists());
    assert_eq!(std::fs::read_dir(&temp_root)?.count(), 0);
    assert!(provider.calls().is_empty());
    Ok(())
}

#[test]
fn test_runWithProvider_withExistingStyledOutput_shouldSkipMedia() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "episode.mp4", "video")?;
    common::create_test_file(temp_dir.path(), "episode.ass", "done")?;
    let provider = MockProvider::new();
    let controller = controller_without_ffmpeg()?;

    let artifacts = tokio_test::block_on(
        controller.run_with_provider(&provider, &video, temp_dir.path(), false)
    )?;

    assert!(artifacts.skipped);
    assert!(artifacts.styled_subtitles.is_none());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withMixedInputs_shouldCountOutcomes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "done.mp4", "video")?;
    common::create_test_file(temp_dir.path(), "done.ass", "styled")?;
    common::create_test_file(temp_dir.path(), "nested/fresh.mp3", "audio")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "ignored")?;
    let provider = MockProvider::new();

    let summary = controller_without_ffmpeg()?
        .with_temp_root(temp_dir.path().join("tmp"))
        .run_folder_with_provider(&provider, temp_dir.path(), false)
        .await?;

    // fresh.mp3 fails because ffmpeg is unavailable
    assert_eq!(summary, FolderSummary { processed: 0, skipped: 1, failed: 1 });
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withRenderedVideosFromEarlierRun_shouldNotTreatThemAsInputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["clip.mp4", "clip.ass", "clip.srt", "clip.soft.mkv", "clip.burned.mp4"] {
        common::create_test_file(temp_dir.path(), name, "earlier run")?;
    }
    let provider = MockProvider::new();

    let summary = controller_without_ffmpeg()?
        .with_temp_root(temp_dir.path().join("tmp"))
        .run_folder_with_provider(&provider, temp_dir.path(), false)
        .await?;

    assert_eq!(summary, FolderSummary { processed: 0, skipped: 1, failed: 0 });
    assert!(provider.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withNoMedia_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "only.srt")?;

    let result = controller_without_ffmpeg()?
        .run_folder_with_provider(&MockProvider::new(), temp_dir.path(), false)
        .await;

    assert!(result.is_err());
    Ok(())
}
