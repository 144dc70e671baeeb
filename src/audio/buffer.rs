//! Rolling sample buffer for one streaming connection.
//!
//! Inbound PCM is decoded into normalized f32 samples and appended; windows
//! are extracted destructively, leaving a configurable trailing tail as
//! acoustic context for the next window.

use crate::error::{Result, StreamscribeError};

/// Append-only, then trimmed, store of normalized audio samples.
///
/// Samples are contiguous and time-ordered; the buffer is owned exclusively
/// by its session and never shared across connections.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Creates an empty buffer for the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    /// Decodes little-endian 16-bit signed PCM and appends the samples.
    ///
    /// Samples are normalized to [-1.0, 1.0] by dividing by 32768.0.
    /// Returns the number of samples appended.
    ///
    /// # Errors
    /// Returns `StreamscribeError::AudioDecode` if the byte length is not a
    /// multiple of 2. The buffer is left unchanged in that case.
    pub fn append_pcm16(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.len() % 2 != 0 {
            return Err(StreamscribeError::AudioDecode {
                message: format!("odd byte length {} is not valid 16-bit PCM", bytes.len()),
            });
        }

        let appended = bytes.len() / 2;
        self.samples.reserve(appended);
        self.samples.extend(
            bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0),
        );
        Ok(appended)
    }

    /// Extracts the most recent `window_secs` of audio, if available.
    ///
    /// Returns `None` when fewer than `window_secs * sample_rate` samples are
    /// buffered — a normal, frequent outcome early in a stream, not an error.
    ///
    /// On success the buffer is truncated in place to the most recent
    /// `keep_secs * sample_rate` samples. The retained tail may overlap with
    /// or be shorter than the extracted window; the overlap controls how much
    /// acoustic context carries into the next window.
    pub fn extract_window(&mut self, window_secs: f32, keep_secs: f32) -> Option<Vec<f32>> {
        let need = (window_secs * self.sample_rate as f32) as usize;
        if need == 0 || self.samples.len() < need {
            return None;
        }

        let window = self.samples[self.samples.len() - need..].to_vec();

        let keep = (keep_secs * self.sample_rate as f32) as usize;
        let trim_to = self.samples.len().saturating_sub(keep);
        self.samples.drain(..trim_to);

        Some(window)
    }

    /// Returns the number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the buffered audio duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Returns the sample rate this buffer was created with.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Discards all buffered samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
