/*!
 * Core translation functionality.
 *
 * `TranslationService` drives a pluggable `Translator` backend: it skips work
 * that cannot change the text, consults the caller's cache, bounds the number
 * of requests in flight, retries failures and always falls back to the
 * original text. Backends themselves (HTTP clients, on-device models) live
 * outside this crate.
 */

use std::fmt::Debug;
use std::ops::ControlFlow;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;

use crate::app_config::{Config, TranslationConfig};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};
use crate::translation::cache::TranslationCache;
use crate::translation::overlay::TranslatedOverlay;

// Entries sampled from the start of a track for language detection
const DETECTION_SAMPLE_ENTRIES: usize = 10;

/// A translation backend
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Stable backend name, used to keep cached results of different backends apart
    fn name(&self) -> &str;

    /// Translate one piece of text
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, TranslationError>;

    /// Guess the language of a text sample
    ///
    /// Backends without detection keep the default, which never guesses.
    async fn detect_language(&self, _sample: &str) -> Option<String> {
        None
    }
}

/// Translation service bound to one backend and one language pair
#[derive(Debug)]
pub struct TranslationService<T> {
    translator: T,
    settings: TranslationConfig,
    source_language: String,
    target_language: String,
    permits: Semaphore,
}

impl<T: Translator> TranslationService<T> {
    /// Create a service using the languages and limits from `config`
    pub fn new(translator: T, config: &Config) -> Self {
        Self::with_languages(
            translator,
            &config.source_language,
            &config.target_language,
            config.translation.clone(),
        )
    }

    pub fn with_languages(translator: T, source_language: &str, target_language: &str, settings: TranslationConfig) -> Self {
        let permits = Semaphore::new(settings.max_concurrent_requests.max(1));
        Self {
            translator,
            settings,
            source_language: normalize_code(source_language),
            target_language: normalize_code(target_language),
            permits,
        }
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn set_source_language(&mut self, code: &str) {
        self.source_language = normalize_code(code);
    }

    pub fn set_target_language(&mut self, code: &str) {
        self.target_language = normalize_code(code);
    }

    /// Whether source and target are the same language, making translation a no-op
    pub fn languages_match(&self) -> bool {
        language_utils::language_codes_match(&self.source_language, &self.target_language)
    }

    /// Ask the backend to detect the sample's language and adopt it as source
    ///
    /// Returns the new source language when it changed.
    pub async fn detect_and_set_source_language(&mut self, sample: &str) -> Option<String> {
        if sample.trim().is_empty() {
            return None;
        }

        let detected = self.translator.detect_language(sample).await?;
        if language_utils::is_undetermined(&detected)
            || language_utils::language_codes_match(&detected, &self.source_language)
        {
            return None;
        }

        info!("Detected source language '{}' (was '{}')", detected, self.source_language);
        self.set_source_language(&detected);
        Some(self.source_language.clone())
    }

    /// Translate text, returning the input unchanged when translation is
    /// pointless or fails
    pub async fn translate(&self, text: &str, cache: &TranslationCache) -> String {
        if text.trim().is_empty() || self.languages_match() {
            return text.to_string();
        }

        let backend = self.translator.name();
        if let Some(cached) = cache.get(backend, &self.source_language, &self.target_language, text) {
            return cached;
        }

        match self.try_translate(text).await {
            Ok(translated) if !translated.trim().is_empty() && translated != text => {
                cache.store(backend, &self.source_language, &self.target_language, text, &translated);
                translated
            },
            Ok(_) => {
                debug!("Backend returned no usable translation, keeping original text");
                text.to_string()
            },
            Err(e) => {
                error!("{}", e);
                text.to_string()
            }
        }
    }

    /// Call the backend with retries, holding one concurrency permit throughout
    pub async fn try_translate(&self, text: &str) -> Result<String, TranslationError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| TranslationError::Backend(e.to_string()))?;

        let attempts = self.settings.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.translator.translate(text, &self.source_language, &self.target_language).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    warn!("Translation attempt {} of {} failed: {}", attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(self.settings.retry_delay_ms)).await;
                    }
                }
            }
        }

        Err(TranslationError::RetriesExhausted { attempts, last_error })
    }

    /// Translate many texts concurrently, keeping their order
    pub async fn translate_batch<S: AsRef<str>>(&self, texts: &[S], cache: &TranslationCache) -> Vec<String> {
        join_all(texts.iter().map(|text| self.translate(text.as_ref(), cache))).await
    }

    /// Translate a whole track entry by entry
    ///
    /// The source language is first re-detected from the opening entries.
    /// `on_update` receives each translated entry as soon as it is ready and
    /// can stop the run by returning `ControlFlow::Break`. The overlay holds
    /// everything translated before the run ended.
    pub async fn translate_track<F>(&mut self, track: &SubtitleTrack, cache: &TranslationCache, mut on_update: F) -> TranslatedOverlay
    where
        F: FnMut(&SubtitleEntry) -> ControlFlow<()>,
    {
        let mut overlay = TranslatedOverlay::new();
        if track.is_empty() {
            return overlay;
        }

        let sample = track
            .iter()
            .take(DETECTION_SAMPLE_ENTRIES)
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.detect_and_set_source_language(&sample).await;

        if self.languages_match() {
            info!("Source and target language are both '{}', nothing to translate", self.target_language);
            return overlay;
        }

        let delay = Duration::from_millis(self.settings.entry_delay_ms);
        for (position, entry) in track.iter().enumerate() {
            let translated = self.translate(&entry.text, cache).await;
            let updated = entry.with_text(translated);

            let flow = on_update(&updated);
            overlay.insert(updated.index, updated.text);

            if flow.is_break() {
                info!("Track translation stopped after {} of {} entries", position + 1, track.len());
                break;
            }

            if !delay.is_zero() && position + 1 < track.len() {
                tokio::time::sleep(delay).await;
            }
        }

        overlay
    }
}

fn normalize_code(code: &str) -> String {
    language_utils::normalize_to_part1_or_part2t(code).unwrap_or_else(|_| code.trim().to_lowercase())
}
