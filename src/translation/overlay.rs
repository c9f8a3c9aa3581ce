/*!
 * Translated text layered over an original subtitle track.
 *
 * The overlay maps an entry's `index` tag to replacement text. The original
 * track is never modified; lookups fall back to the original text for
 * entries that have not been translated (yet).
 */

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};

/// Replacement text keyed by entry index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedOverlay {
    texts: HashMap<i32, String>,
}

impl TranslatedOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the translation for an entry index, replacing any earlier one
    pub fn insert(&mut self, index: i32, text: impl Into<String>) {
        self.texts.insert(index, text.into());
    }

    pub fn get(&self, index: i32) -> Option<&str> {
        self.texts.get(&index).map(String::as_str)
    }

    /// Translated text for an entry, or its original text
    pub fn text_for<'a>(&'a self, entry: &'a SubtitleEntry) -> &'a str {
        self.get(entry.index).unwrap_or(&entry.text)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Parse an overlay from a JSON object such as `{"1": "Salut"}`
    pub fn from_json(json: &str) -> Result<Self, SubtitleError> {
        serde_json::from_str(json).map_err(|e| SubtitleError::InvalidOverlay(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read overlay file: {}", path.display()))?;
        Ok(Self::from_json(&json)?)
    }
}

impl Extend<(i32, String)> for TranslatedOverlay {
    fn extend<T: IntoIterator<Item = (i32, String)>>(&mut self, iter: T) {
        self.texts.extend(iter);
    }
}

impl FromIterator<(i32, String)> for TranslatedOverlay {
    fn from_iter<T: IntoIterator<Item = (i32, String)>>(iter: T) -> Self {
        Self {
            texts: iter.into_iter().collect(),
        }
    }
}

impl SubtitleTrack {
    /// New track with overlay text substituted where present
    ///
    /// Timing and order are unchanged, so every timeline lookup behaves the
    /// same on the result as on the original.
    pub fn with_overlay(&self, overlay: &TranslatedOverlay) -> SubtitleTrack {
        SubtitleTrack::from_entries(
            self.iter()
                .map(|entry| entry.with_text(overlay.text_for(entry)))
                .collect(),
        )
    }
}

/// Text showing at `position_ms`, preferring the overlay's translation
pub fn current_text_with_overlay<'a>(
    track: &'a SubtitleTrack,
    overlay: &'a TranslatedOverlay,
    position_ms: u64,
) -> Option<&'a str> {
    track
        .current_entry(position_ms)
        .map(|entry| overlay.text_for(entry))
}
