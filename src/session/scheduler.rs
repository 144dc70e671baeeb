//! Rate limiter over inference attempts.
//!
//! Inference is expensive relative to the audio arrival rate: frames may land
//! many times per second in small chunks, and without throttling every
//! inbound frame would trigger a transcription call.

use std::time::{Duration, Instant};

/// Decides whether enough time has elapsed since the last inference attempt.
///
/// The check and the timestamp commit are a single step: when
/// [`should_attempt`](WindowScheduler::should_attempt) returns true, the
/// attempt is considered made and the clock restarts, whether or not a window
/// turns out to be available.
#[derive(Debug, Clone, Default)]
pub struct WindowScheduler {
    last_attempt: Option<Instant>,
}

impl WindowScheduler {
    /// Creates a scheduler that has never fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true iff more than `min_interval` has elapsed since the last
    /// allowed attempt (or no attempt was ever made), committing `now` as the
    /// new last-attempt time when it does.
    pub fn should_attempt(&mut self, now: Instant, min_interval: Duration) -> bool {
        let due = match self.last_attempt {
            None => true,
            Some(last) => now.duration_since(last) > min_interval,
        };
        if due {
            self.last_attempt = Some(now);
        }
        due
    }

    /// Forgets the last attempt, returning to the never-fired state.
    pub fn reset(&mut self) {
        self.last_attempt = None;
    }
}
