//! JSON message protocol between clients and the relay.
//!
//! Binary WebSocket frames carry raw PCM audio and are not represented here;
//! this module covers the text frames flowing in both directions.

use serde::{Deserialize, Serialize};

/// Message type for control frames.
pub const CONTROL: &str = "control";

/// Message type clients use to report an error on their side.
pub const CLIENT_ERROR: &str = "client-error";

/// Inbound text frame, parsed leniently.
///
/// Only the `type` field is required; unknown types are accepted and ignored
/// rather than rejected, so a newer client does not break an older server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientMessage {
    /// Message discriminator (`"control"`, `"client-error"`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Requested language hint; empty or absent means auto-detect.
    #[serde(rename = "setLanguage", default)]
    pub set_language: Option<String>,
    /// Free-form payload, used by `client-error` reports.
    #[serde(default)]
    pub message: Option<String>,
}

impl ClientMessage {
    /// Deserialize a client message from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Outbound text frame sent to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Ready greeting or acknowledgement (e.g. `lang-set:de`).
    Info { message: String },
    /// Non-final, possibly-revised transcription of recent audio.
    Partial { text: String },
    /// Transcription judged stable and committed.
    Final { text: String },
    /// Malformed input or internal failure; non-fatal to the connection.
    Error { message: String },
}

impl ServerEvent {
    /// Serialize the event to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an event from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
