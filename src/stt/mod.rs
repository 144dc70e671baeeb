//! Speech-to-text capability.
//!
//! The [`Transcriber`] trait is the seam between the streaming core and the
//! inference engine; sessions never see whisper-rs directly.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, RecordedCall, Transcriber};
pub use whisper::{WhisperConfig, WhisperTranscriber};
