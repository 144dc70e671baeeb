//! Partial/final emission state machine.
//!
//! Successive overlapping windows re-transcribe the same trailing audio, so
//! once the speaker pauses the model keeps producing the same text. A fixed
//! dwell time converts that stable repetition into a commitment signal
//! without explicit end-of-utterance detection.

use std::time::{Duration, Instant};

/// Outcome of feeding one transcription result to the stabilizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// A new or revised tentative transcription.
    Partial(String),
    /// A transcription judged stable and committed.
    Final(String),
}

/// The currently active partial, if any.
#[derive(Debug, Clone)]
struct ActivePartial {
    text: String,
    since: Instant,
}

/// Tracks the last emitted partial text and decides partial vs. final
/// emission, suppressing duplicate output.
///
/// At most one partial is active per session; a final emission always resets
/// the active partial. Only successful transcription results reach this type;
/// inference failures are handled at the session boundary and never touch
/// stabilizer state.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStabilizer {
    active: Option<ActivePartial>,
}

impl TranscriptStabilizer {
    /// Creates a stabilizer with no active partial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one inference result and returns the event to emit, if any.
    ///
    /// Leading and trailing whitespace in `text` is ignored. An empty result
    /// (no speech detected) never emits and never changes state.
    pub fn observe(
        &mut self,
        text: &str,
        now: Instant,
        stability_timeout: Duration,
    ) -> Option<Emission> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match &self.active {
            Some(partial) if partial.text == text => {
                if now.duration_since(partial.since) > stability_timeout {
                    self.active = None;
                    Some(Emission::Final(text.to_string()))
                } else {
                    // Identical but not yet stable: keep waiting.
                    None
                }
            }
            _ => {
                self.active = Some(ActivePartial {
                    text: text.to_string(),
                    since: now,
                });
                Some(Emission::Partial(text.to_string()))
            }
        }
    }

    /// Returns the text of the active partial, if one exists.
    pub fn active_partial(&self) -> Option<&str> {
        self.active.as_ref().map(|p| p.text.as_str())
    }

    /// Drops any active partial.
    pub fn reset(&mut self) {
        self.active = None;
    }
}
