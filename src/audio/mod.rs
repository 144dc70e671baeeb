//! Audio buffering for streaming transcription.

pub mod buffer;

pub use buffer::SampleBuffer;
