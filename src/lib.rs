//! streamscribe - Real-time speech-to-text relay
//!
//! Clients stream raw 16-bit mono PCM over WebSocket; the relay answers with
//! partial transcriptions that are promoted to finals once they stabilize.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod stt;

// Core traits and types
pub use audio::SampleBuffer;
pub use session::{Session, SessionConfig, TranscriptStabilizer, WindowScheduler};
pub use stt::transcriber::Transcriber;

// Protocol
pub use protocol::{ClientMessage, ServerEvent};

// Error handling
pub use error::{Result, StreamscribeError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
