use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::SubtitleError;
use crate::media_name;
use crate::subtitle_processor::{ParseOptions, SubtitleTrack};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @checks: SRT extension, case-insensitive
    pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
    }

    /// Read and parse a subtitle file, reporting I/O failures
    pub fn try_read_subtitle_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<SubtitleTrack, SubtitleError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| SubtitleError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(SubtitleTrack::parse_bytes_with_options(&bytes, options))
    }

    /// Read and parse a subtitle file; an unreadable file yields an empty track
    pub fn read_subtitle_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> SubtitleTrack {
        Self::try_read_subtitle_file(path, options).unwrap_or_else(|e| {
            warn!("{}", e);
            SubtitleTrack::default()
        })
    }

    // @generates: Output path for a translated subtitle
    pub fn translated_output_path<P: AsRef<Path>>(output_dir: P, movie_name: &str) -> PathBuf {
        output_dir.as_ref().join(media_name::translated_file_name(movie_name))
    }

    /// Save a translated track as `<movie>_translated.srt` inside `output_dir`
    pub fn save_translated<P: AsRef<Path>>(track: &SubtitleTrack, movie_name: &str, output_dir: P) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        Self::ensure_dir(output_dir)?;

        let path = Self::translated_output_path(output_dir, movie_name);
        fs::write(&path, track.to_srt()).map_err(|e| SubtitleError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!("Saved {} entries to {}", track.len(), path.display());
        Ok(path)
    }
}
