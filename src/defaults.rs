//! Default configuration constants for streamscribe.
//!
//! Shared constants used across configuration types to keep the server,
//! session, and test defaults in one place.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition; inbound PCM is expected to
/// already be mono at this rate (no resampling is performed).
pub const SAMPLE_RATE: u32 = 16000;

/// Default inference window duration in seconds.
///
/// Each transcription call sees the most recent `WINDOW_SECS` of audio.
pub const WINDOW_SECS: f32 = 2.0;

/// Default retained context duration in seconds.
///
/// After a window is extracted, the buffer keeps this much trailing audio so
/// the next window overlaps the previous one. The overlap is what makes a
/// repeated, unchanged transcription likely once the speaker has stopped.
pub const KEEP_SECS: f32 = 1.25;

/// Default minimum interval between inference attempts in seconds.
///
/// Audio frames may arrive many times per second; without this throttle every
/// inbound frame would trigger inference.
pub const EMIT_INTERVAL_SECS: f32 = 0.25;

/// Default partial-stability timeout in seconds.
///
/// A partial transcription that stays unchanged for this long is promoted to
/// a final result.
pub const STABILITY_TIMEOUT_SECS: f32 = 1.0;

/// Default bind address.
pub const HOST: &str = "127.0.0.1";

/// Default listen port.
pub const PORT: u16 = 8765;

/// Default maximum inbound WebSocket message size in bytes (8 MiB).
pub const MAX_MESSAGE_BYTES: usize = 8 * 1024 * 1024;

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default Whisper model path.
pub const DEFAULT_MODEL_PATH: &str = "models/ggml-base.bin";

/// Greeting sent to a client immediately after the WebSocket handshake.
pub const READY_MESSAGE: &str = "asr-ready";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_default_exceeds_keep_default() {
        // The retained tail may overlap the extracted window but the defaults
        // keep less than one full window of context.
        assert!(KEEP_SECS < WINDOW_SECS);
    }

    #[test]
    fn max_message_bytes_matches_eight_mebibytes() {
        assert_eq!(MAX_MESSAGE_BYTES, 1 << 23);
    }
}
