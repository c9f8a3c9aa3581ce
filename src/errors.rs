/*!
 * Error types for the subtimeline crate.
 *
 * Parsing and timeline lookups never fail; these types only cover the edges
 * of the crate: reading and writing files, configuration and translation
 * backends.
 */

use thiserror::Error;

/// Errors that can occur when reading or writing subtitle files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Error reading a subtitle file
    #[error("Failed to read subtitle file {path}: {message}")]
    ReadFailed {
        /// Path of the file
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Error writing a subtitle file
    #[error("Failed to write subtitle file {path}: {message}")]
    WriteFailed {
        /// Path of the file
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Overlay document could not be decoded
    #[error("Invalid overlay: {0}")]
    InvalidOverlay(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error returned by the translation backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// Every attempt failed
    #[error("Translation failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last failure
        last_error: String,
    },
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// Configuration file could not be decoded
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
