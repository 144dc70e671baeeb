//! Per-connection session state and event handling.
//!
//! One [`Session`] exists per WebSocket connection and owns the connection's
//! sample buffer, window scheduler, stabilizer, and language preference.
//! Events are processed strictly in arrival order; the session never shares
//! mutable state with other connections.

pub mod scheduler;
pub mod stabilizer;

pub use scheduler::WindowScheduler;
pub use stabilizer::{Emission, TranscriptStabilizer};

use crate::audio::SampleBuffer;
use crate::config::Config;
use crate::defaults;
use crate::error::StreamscribeError;
use crate::protocol::{self, ClientMessage, ServerEvent};
use crate::stt::Transcriber;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Streaming parameters for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sample rate of inbound PCM in Hz.
    pub sample_rate: u32,
    /// Inference window duration in seconds.
    pub window_secs: f32,
    /// Trailing context retained after each extraction, in seconds.
    pub keep_secs: f32,
    /// Minimum interval between inference attempts.
    pub emit_interval: Duration,
    /// Dwell time before an unchanged partial is promoted to final.
    pub stability_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            window_secs: defaults::WINDOW_SECS,
            keep_secs: defaults::KEEP_SECS,
            emit_interval: Duration::from_secs_f32(defaults::EMIT_INTERVAL_SECS),
            stability_timeout: Duration::from_secs_f32(defaults::STABILITY_TIMEOUT_SECS),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            window_secs: config.streaming.window_secs,
            keep_secs: config.streaming.keep_secs,
            emit_interval: config.streaming.emit_interval(),
            stability_timeout: config.streaming.stability_timeout(),
        }
    }
}

/// State for one client connection.
///
/// Binds a sample buffer, a window scheduler, a transcript stabilizer, and a
/// mutable language hint to one connection, and turns inbound audio/control
/// events into outbound [`ServerEvent`]s.
pub struct Session {
    id: String,
    language: Option<String>,
    buffer: SampleBuffer,
    scheduler: WindowScheduler,
    stabilizer: TranscriptStabilizer,
    transcriber: Arc<dyn Transcriber>,
    config: SessionConfig,
}

impl Session {
    /// Creates a fresh session for a newly accepted connection.
    pub fn new(id: String, transcriber: Arc<dyn Transcriber>, config: SessionConfig) -> Self {
        let buffer = SampleBuffer::new(config.sample_rate);
        Self {
            id,
            language: None,
            buffer,
            scheduler: WindowScheduler::new(),
            stabilizer: TranscriptStabilizer::new(),
            transcriber,
            config,
        }
    }

    /// Returns this session's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the current language hint, if one is set.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The greeting sent immediately after the handshake.
    pub fn greeting() -> ServerEvent {
        ServerEvent::Info {
            message: defaults::READY_MESSAGE.to_string(),
        }
    }

    /// Processes one inbound binary audio frame.
    ///
    /// Appends the decoded samples, then — if the scheduler allows an attempt
    /// and a full window is buffered — runs inference and feeds the result to
    /// the stabilizer. Emits zero or one outbound event.
    ///
    /// Decode and inference failures are reported as `error` events and leave
    /// buffer and stabilizer state intact; the session continues.
    pub fn on_audio(&mut self, bytes: &[u8], now: Instant) -> Option<ServerEvent> {
        if let Err(e) = self.buffer.append_pcm16(bytes) {
            warn!(session = %self.id, error = %e, "audio frame rejected");
            return Some(ServerEvent::Error {
                message: e.to_string(),
            });
        }

        if !self
            .scheduler
            .should_attempt(now, self.config.emit_interval)
        {
            return None;
        }

        let window = self
            .buffer
            .extract_window(self.config.window_secs, self.config.keep_secs)?;

        match self.transcriber.transcribe(&window, self.language.as_deref()) {
            Ok(text) => self
                .stabilizer
                .observe(&text, now, self.config.stability_timeout)
                .map(|emission| match emission {
                    Emission::Partial(text) => {
                        debug!(session = %self.id, %text, "partial");
                        ServerEvent::Partial { text }
                    }
                    Emission::Final(text) => {
                        debug!(session = %self.id, %text, "final");
                        ServerEvent::Final { text }
                    }
                }),
            Err(e) => {
                error!(session = %self.id, error = %e, "inference failed");
                Some(ServerEvent::Error {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Processes one inbound text frame.
    ///
    /// A `control` message with a `setLanguage` field updates the language
    /// hint (empty or absent clears it back to auto-detect) and is
    /// acknowledged. A `client-error` message is logged only. Any other
    /// object with a `type` field is accepted and ignored. Non-parseable
    /// text yields an `error` event without terminating the connection.
    pub fn on_text(&mut self, text: &str) -> Option<ServerEvent> {
        let msg = match ClientMessage::from_json(text) {
            Ok(msg) => msg,
            Err(e) => {
                error!(session = %self.id, error = %e, "bad msg");
                let err = StreamscribeError::MessageParse {
                    message: e.to_string(),
                };
                return Some(ServerEvent::Error {
                    message: err.to_string(),
                });
            }
        };

        match msg.kind.as_str() {
            protocol::CONTROL => {
                self.set_language(msg.set_language);
                Some(ServerEvent::Info {
                    message: format!(
                        "lang-set:{}",
                        self.language.as_deref().unwrap_or(defaults::AUTO_LANGUAGE)
                    ),
                })
            }
            protocol::CLIENT_ERROR => {
                warn!(
                    session = %self.id,
                    message = msg.message.as_deref().unwrap_or(""),
                    "client-error"
                );
                None
            }
            other => {
                debug!(session = %self.id, kind = other, "ignoring message");
                None
            }
        }
    }

    /// Updates the language hint; affects only subsequent inference calls.
    fn set_language(&mut self, code: Option<String>) {
        self.language = code.filter(|c| !c.is_empty());
    }

    /// Releases all session state. Idempotent.
    pub fn on_close(&mut self) {
        self.buffer.clear();
        self.scheduler.reset();
        self.stabilizer.reset();
    }
}
