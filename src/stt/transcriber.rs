use crate::error::{Result, StreamscribeError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Trait for the speech-to-text capability.
///
/// The capability is stateless across calls: every invocation receives the
/// full window and language hint, so one process-wide instance can serve all
/// sessions. Implementations that are not safe for concurrent use must
/// serialize internally. This trait allows swapping implementations (real
/// Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio window to text.
    ///
    /// # Arguments
    /// * `window` - Normalized f32 mono samples at the deployment sample rate
    /// * `language` - Language hint for this call; `None` means auto-detect
    ///
    /// # Returns
    /// Transcribed text (possibly empty when no speech is detected) or error
    fn transcribe(&self, window: &[f32], language: Option<&str>) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, window: &[f32], language: Option<&str>) -> Result<String> {
        (**self).transcribe(window, language)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// One recorded call to a [`MockTranscriber`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Number of samples in the submitted window.
    pub window_len: usize,
    /// Language hint the call carried.
    pub language: Option<String>,
}

/// Mock transcriber for testing.
///
/// Returns a fixed response, or a scripted sequence of responses when
/// configured with `with_responses`, and records every call it receives.
#[derive(Debug)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    scripted: Mutex<VecDeque<String>>,
    should_fail: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            scripted: Mutex::new(VecDeque::new()),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the mock to return a specific response on every call
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure a scripted sequence of responses; once exhausted, the fixed
    /// response is returned.
    pub fn with_responses(self, responses: &[&str]) -> Self {
        {
            let mut scripted = self.scripted.lock().unwrap_or_else(|e| e.into_inner());
            scripted.extend(responses.iter().map(|s| s.to_string()));
        }
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns the number of transcribe calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, window: &[f32], language: Option<&str>) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                window_len: window.len(),
                language: language.map(|l| l.to_string()),
            });

        if self.should_fail {
            return Err(StreamscribeError::Inference {
                message: "mock transcription failure".to_string(),
            });
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Ok(scripted.unwrap_or_else(|| self.response.clone()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
