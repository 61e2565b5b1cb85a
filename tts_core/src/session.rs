//! Streaming synthesis session against the persistent narration service.
//!
//! One session serves exactly one request. The connection lifecycle is an
//! explicit state machine (Idle → Connecting → Streaming → Closed/Failed)
//! and the session resolves exactly once: the inbound stream races a
//! wall-clock timeout, and whichever of {turn end, close, timeout} happens
//! first settles the result. Dropping the future cancels the session; the
//! socket is closed when the stream is dropped, so resources are released
//! on every exit path.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::error::SynthesisError;
use crate::frame::{self, Frame};
use crate::protocol::{self, VoiceConfig};
use crate::timeline::Timeline;

/// Generous ceiling: long narrations stream for a while
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: String,
    pub voice: VoiceConfig,
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: protocol::DEFAULT_ENDPOINT.to_string(),
            voice: VoiceConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Closed,
    Failed,
}

/// Contiguous audio plus the word-timing index (empty if the service sent
/// no usable metadata)
#[derive(Debug, Clone, Default)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub timeline: Timeline,
}

pub struct SynthesisSession {
    config: SessionConfig,
    state: SessionState,
}

impl SynthesisSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run one synthesis request to completion.
    ///
    /// Resolves exactly once; calling again on a settled session is a
    /// protocol error. Non-empty audio at timeout still counts as success
    /// (partial audio beats no audio for a narration that was cut short).
    pub async fn synthesize(&mut self, text: &str) -> Result<SynthesisResult, SynthesisError> {
        if self.state != SessionState::Idle {
            return Err(SynthesisError::Protocol(
                "session already settled; create a new session per request".to_string(),
            ));
        }

        let outcome = self.run(text).await;
        self.state = match outcome {
            Ok(_) => SessionState::Closed,
            Err(_) => SessionState::Failed,
        };
        outcome
    }

    async fn run(&mut self, text: &str) -> Result<SynthesisResult, SynthesisError> {
        self.state = SessionState::Connecting;
        let (mut ws, _) = connect_async(self.config.endpoint.as_str())
            .await
            .map_err(|e| SynthesisError::Network(format!("connect failed: {e}")))?;

        let request_id = protocol::new_request_id();
        debug!(%request_id, "connection open, sending config and ssml frames");
        ws.send(Message::Text(protocol::speech_config_frame(
            &self.config.voice,
        )))
        .await
        .map_err(|e| SynthesisError::Network(format!("config frame send failed: {e}")))?;
        ws.send(Message::Text(protocol::ssml_frame(
            &request_id,
            &self.config.voice,
            text,
        )))
        .await
        .map_err(|e| SynthesisError::Network(format!("ssml frame send failed: {e}")))?;

        self.state = SessionState::Streaming;
        let mut audio: Vec<u8> = Vec::new();
        let mut timeline = Timeline::new();

        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    let _ = ws.close(None).await;
                    if audio.is_empty() {
                        return Err(SynthesisError::Timeout(self.config.timeout));
                    }
                    warn!(bytes = audio.len(), "timeout hit with partial audio, resolving success");
                    return Ok(SynthesisResult { audio, timeline });
                }
                inbound = ws.next() => {
                    match inbound {
                        Some(Ok(Message::Binary(buf))) => {
                            match frame::parse_binary(&buf) {
                                Ok(Frame::Audio(bytes)) => audio.extend_from_slice(&bytes),
                                Ok(Frame::Metadata(boundaries)) => timeline.extend(boundaries),
                                Ok(_) => {}
                                // Untrusted header length corrupts audio framing
                                Err(e) => return Err(SynthesisError::Protocol(e.to_string())),
                            }
                        }
                        Some(Ok(Message::Text(msg))) => {
                            match frame::parse_text(&msg) {
                                Frame::TurnEnd => {
                                    let _ = ws.close(None).await;
                                    debug!(bytes = audio.len(), words = timeline.len(), "turn end");
                                    if audio.is_empty() {
                                        return Err(SynthesisError::EmptyAudio);
                                    }
                                    return Ok(SynthesisResult { audio, timeline });
                                }
                                Frame::Metadata(boundaries) => timeline.extend(boundaries),
                                _ => {}
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            if audio.is_empty() {
                                return Err(SynthesisError::EmptyAudio);
                            }
                            return Ok(SynthesisResult { audio, timeline });
                        }
                        Some(Ok(_)) => {} // ping/pong, handled by the transport
                        Some(Err(e)) => {
                            return Err(SynthesisError::Network(format!("stream error: {e}")));
                        }
                    }
                }
            }
        }
    }
}
