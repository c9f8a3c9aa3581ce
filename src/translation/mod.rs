/*!
 * Translation of subtitle text through pluggable backends.
 *
 * - `core`: the `Translator` backend trait and `TranslationService`
 * - `cache`: bounded LRU cache owned by the caller
 * - `overlay`: translated text layered over an original track
 */

pub use self::cache::TranslationCache;
pub use self::core::{TranslationService, Translator};
pub use self::overlay::{current_text_with_overlay, TranslatedOverlay};

pub mod cache;
pub mod core;
pub mod overlay;
