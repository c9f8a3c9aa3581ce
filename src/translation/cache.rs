/*!
 * Translation caching functionality.
 *
 * A bounded, least-recently-used cache of translated strings. The host
 * application creates one and passes it by reference into translation calls;
 * there is no process-wide instance.
 */

use std::num::NonZeroUsize;

use log::debug;
use lru::LruCache;
use parking_lot::Mutex;

/// Cache key combining backend, languages and source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Name of the translation backend
    backend: String,

    /// Source language code
    source_language: String,

    /// Target language code
    target_language: String,

    /// Source text to translate
    source_text: String,
}

impl CacheKey {
    fn new(backend: &str, source_language: &str, target_language: &str, source_text: &str) -> Self {
        Self {
            backend: backend.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            source_text: source_text.to_string(),
        }
    }
}

#[derive(Debug)]
struct CacheState {
    entries: LruCache<CacheKey, String>,
    hits: usize,
    misses: usize,
}

/// Bounded translation cache, safe to share between tasks
#[derive(Debug)]
pub struct TranslationCache {
    state: Mutex<CacheState>,
}

impl TranslationCache {
    /// Create a cache holding at most `capacity` translations (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Get a translation, marking it as recently used
    pub fn get(&self, backend: &str, source_language: &str, target_language: &str, source_text: &str) -> Option<String> {
        let key = CacheKey::new(backend, source_language, target_language, source_text);
        let mut state = self.state.lock();

        match state.entries.get(&key).cloned() {
            Some(translation) => {
                state.hits += 1;
                debug!("Cache hit for '{}' ({} -> {})",
                       truncate_text(source_text, 30),
                       source_language,
                       target_language);
                Some(translation)
            },
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Store a translation, evicting the least recently used one when full
    pub fn store(&self, backend: &str, source_language: &str, target_language: &str, source_text: &str, translation: &str) {
        let key = CacheKey::new(backend, source_language, target_language, source_text);
        let mut state = self.state.lock();

        if let Some((evicted, _)) = state.entries.push(key.clone(), translation.to_string()) {
            if evicted != key {
                debug!("Evicted cached translation for '{}'", truncate_text(&evicted.source_text, 30));
            }
        }
    }

    /// Hits, misses and hit rate
    pub fn stats(&self) -> (usize, usize, f64) {
        let state = self.state.lock();
        let total = state.hits + state.misses;

        let hit_rate = if total > 0 {
            state.hits as f64 / total as f64
        } else {
            0.0
        };

        (state.hits, state.misses, hit_rate)
    }

    /// Drop every translation and reset statistics
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        debug!("Translation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(500)
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
