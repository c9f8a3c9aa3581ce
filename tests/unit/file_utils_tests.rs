/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use subtimeline::errors::SubtitleError;
use subtimeline::file_utils::FileManager;
use subtimeline::subtitle_processor::{ParseOptions, SubtitleTrack};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&test_subdir)?;
    assert!(test_subdir.is_dir());

    // Already existing is fine
    FileManager::ensure_dir(&test_subdir)?;

    Ok(())
}

#[test]
fn test_is_subtitle_file_withExtensions_shouldMatchSrtOnly() {
    assert!(FileManager::is_subtitle_file("movie.srt"));
    assert!(FileManager::is_subtitle_file("MOVIE.SRT"));
    assert!(!FileManager::is_subtitle_file("movie.mkv"));
    assert!(!FileManager::is_subtitle_file("srt"));
}

#[test]
fn test_try_read_subtitle_file_withValidFile_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let track = FileManager::try_read_subtitle_file(&path, &ParseOptions::default())?;

    assert_eq!(track.len(), 3);
    assert_eq!(track.current_text(6000), Some("It contains multiple entries."));

    Ok(())
}

#[test]
fn test_try_read_subtitle_file_withMissingFile_shouldReturnReadFailed() {
    let result = FileManager::try_read_subtitle_file("does/not/exist.srt", &ParseOptions::default());
    assert!(matches!(result, Err(SubtitleError::ReadFailed { .. })));
}

#[test]
fn test_read_subtitle_file_withMissingFile_shouldReturnEmptyTrack() {
    let track = FileManager::read_subtitle_file("does/not/exist.srt", &ParseOptions::default());
    assert!(track.is_empty());
}

#[test]
fn test_read_subtitle_file_withNonUtf8Bytes_shouldStillParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("latin1.srt");
    // "Café" in Latin-1
    fs::write(&path, b"1\n00:00:01,000 --> 00:00:02,000\nCaf\xe9\n")?;

    let track = FileManager::read_subtitle_file(&path, &ParseOptions::default());

    assert_eq!(track.len(), 1);
    assert!(track.entries()[0].text.starts_with("Caf"));

    Ok(())
}

#[test]
fn test_translated_output_path_withMovieName_shouldSanitize() {
    let path = FileManager::translated_output_path("/tmp/output", "The Matrix");
    assert_eq!(path, Path::new("/tmp/output/The_Matrix_translated.srt"));
}

#[test]
fn test_save_translated_withTrack_shouldWriteSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("Subtitles");
    let track = SubtitleTrack::parse(common::HELLO_WORLD_SRT);

    let path = FileManager::save_translated(&track, "The Matrix", &output_dir)?;

    assert_eq!(path, output_dir.join("The_Matrix_translated.srt"));
    let written = fs::read_to_string(&path)?;
    assert_eq!(SubtitleTrack::parse(&written), track);

    Ok(())
}

#[test]
fn test_write_to_srt_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");
    let track = SubtitleTrack::parse(common::HELLO_WORLD_SRT);

    track.write_to_srt(&path)?;

    assert_eq!(fs::read_to_string(&path)?, track.to_srt());

    Ok(())
}
