//! Narration pipeline: script generation, streaming synthesis, fallback.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::NarrationError;
use crate::fallback::{FallbackConfig, FallbackSynthesizer};
use crate::session::{SessionConfig, SynthesisSession};
use crate::timeline::Timeline;

/// Turns raw chapter text into a narration script. Failures here are fatal:
/// without a script there is nothing to synthesize.
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    async fn generate_script(&self, text: &str, chapter_title: &str) -> anyhow::Result<String>;
}

#[async_trait]
impl ScriptProvider for Box<dyn ScriptProvider> {
    async fn generate_script(&self, text: &str, chapter_title: &str) -> anyhow::Result<String> {
        (**self).generate_script(text, chapter_title).await
    }
}

/// What the caller receives: audio bytes, the narrated script, and the
/// word-timing index (empty when only the fallback path produced audio)
#[derive(Debug, Clone, Serialize)]
pub struct NarrationResult {
    pub audio: Vec<u8>,
    pub script: String,
    pub timeline: Timeline,
}

pub struct NarrationPipeline<P> {
    provider: P,
    session_config: SessionConfig,
    fallback: FallbackSynthesizer,
}

impl<P: ScriptProvider> NarrationPipeline<P> {
    pub fn new(
        provider: P,
        session_config: SessionConfig,
        fallback_config: FallbackConfig,
    ) -> Self {
        Self {
            provider,
            session_config,
            fallback: FallbackSynthesizer::new(fallback_config),
        }
    }

    /// Produce narrated audio for one chapter excerpt.
    ///
    /// Streaming synthesis first; on failure the chunked fallback. The
    /// result is full success (audio + timeline), degraded success (audio
    /// only), or a single structured error carrying both failures.
    pub async fn narrate(
        &self,
        text: &str,
        chapter_title: &str,
    ) -> Result<NarrationResult, NarrationError> {
        let script = self
            .provider
            .generate_script(text, chapter_title)
            .await
            .map_err(NarrationError::UpstreamScript)?;
        if script.trim().is_empty() {
            return Err(NarrationError::UpstreamScript(anyhow::anyhow!(
                "provider returned an empty script"
            )));
        }

        info!(chars = script.chars().count(), "script ready, starting streaming synthesis");
        let mut session = SynthesisSession::new(self.session_config.clone());
        match session.synthesize(&script).await {
            Ok(result) => {
                info!(bytes = result.audio.len(), words = result.timeline.len(), "streaming synthesis done");
                Ok(NarrationResult {
                    audio: result.audio,
                    script,
                    timeline: result.timeline,
                })
            }
            Err(primary) => {
                warn!(%primary, "streaming synthesis failed, trying chunked fallback");
                match self.fallback.synthesize(&script).await {
                    Ok(audio) => {
                        info!(bytes = audio.len(), "fallback synthesis done, no timeline");
                        Ok(NarrationResult {
                            audio,
                            script,
                            timeline: Timeline::new(),
                        })
                    }
                    Err(fallback) => Err(NarrationError::FallbackExhausted { primary, fallback }),
                }
            }
        }
    }
}
