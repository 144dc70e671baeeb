//! Error types for streamscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamscribeError {
    // Audio decoding errors
    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // Inbound message errors; the display text goes to clients verbatim
    #[error("bad msg: {message}")]
    MessageParse { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    Inference { message: String },

    // Connection errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    // Bootstrap errors (fatal, before serving)
    #[error("Startup error: {message}")]
    Startup { message: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, StreamscribeError>;
