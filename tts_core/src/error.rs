use std::time::Duration;

use thiserror::Error;

/// Terminal outcomes of a single synthesis attempt (streaming or fallback)
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("synthesis timed out after {0:?} with no audio")]
    Timeout(Duration),

    #[error("stream closed without audio data")]
    EmptyAudio,
}

/// Errors surfaced to the caller of the narration pipeline
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("script generation failed: {0}")]
    UpstreamScript(#[source] anyhow::Error),

    #[error("streaming synthesis failed ({primary}) and chunked fallback failed ({fallback})")]
    FallbackExhausted {
        primary: SynthesisError,
        fallback: SynthesisError,
    },
}
