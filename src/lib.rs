/*!
 * # subtimeline
 *
 * A Rust library for parsing SRT subtitles and resolving which caption is
 * on screen at a playback position.
 *
 * ## Features
 *
 * - Tolerant SRT parsing: malformed blocks are skipped, never fatal
 * - Any line-ending convention, comma or period millisecond separators
 * - O(log n) "what is showing now" lookups, safe to call on every player tick
 * - Deterministic results for overlapping captions
 * - Translated overlays with fallback to the original text
 * - Bounded LRU translation cache owned by the caller
 *
 * ## Architecture
 *
 * - `subtitle_processor`: `SubtitleEntry`, `SubtitleTrack` and the SRT parser
 * - `timeline`: position lookups and the optional `TimelineCursor`
 * - `translation`: backend trait, service, cache and overlay:
 *   - `translation::core`: `Translator` and `TranslationService`
 *   - `translation::cache`: LRU cache of translated strings
 *   - `translation::overlay`: index to translated text mapping
 * - `media_name`: movie titles and search queries from file names
 * - `file_utils`: reading and saving subtitle files
 * - `app_config`: configuration management
 * - `language_utils`: ISO language code utilities
 * - `errors`: custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media_name;
pub mod subtitle_processor;
pub mod timeline;
pub mod translation;

pub use app_config::Config;
pub use errors::{ConfigError, SubtitleError, TranslationError};
pub use subtitle_processor::{parse, InvalidTimingPolicy, ParseOptions, SubtitleEntry, SubtitleTrack};
pub use timeline::{current_entry, current_text, TimelineCursor};
pub use translation::{current_text_with_overlay, TranslatedOverlay, TranslationCache, TranslationService, Translator};
