//! Chunked request/response fallback for when the streaming path fails.
//!
//! The fallback provider takes short query-encoded text per call, so the
//! script is split into length-bounded chunks and synthesized one call per
//! chunk, strictly sequentially to keep the concatenated audio in script
//! order. No word timings are produced on this path.

use tracing::debug;

use crate::error::SynthesisError;

/// The fallback endpoint rejects long query strings
pub const DEFAULT_CHUNK_CEILING: usize = 180;
pub const DEFAULT_FALLBACK_ENDPOINT: &str = "https://translate.google.com/translate_tts";
pub const DEFAULT_FALLBACK_LOCALE: &str = "bn";

#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub endpoint: String,
    pub locale: String,
    pub chunk_ceiling: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FALLBACK_ENDPOINT.to_string(),
            locale: DEFAULT_FALLBACK_LOCALE.to_string(),
            chunk_ceiling: DEFAULT_CHUNK_CEILING,
        }
    }
}

/// Split `text` into ordered chunks of at most `ceiling` characters.
///
/// Greedy accumulation: keep appending the next space-joined word unless it
/// would push the chunk over the ceiling. A single word longer than the
/// ceiling becomes its own oversized chunk rather than being cut mid-word.
pub fn split_chunks(text: &str, ceiling: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_chars = word_chars;
        } else if current_chars + 1 + word_chars > ceiling {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_chars = word_chars;
        } else {
            current.push(' ');
            current.push_str(word);
            current_chars += 1 + word_chars;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub struct FallbackSynthesizer {
    config: FallbackConfig,
    client: reqwest::Client,
}

impl FallbackSynthesizer {
    pub fn new(config: FallbackConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Synthesize the whole text chunk by chunk and concatenate the raw
    /// audio bytes in chunk order. Any chunk failure aborts the whole run.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let chunks = split_chunks(text, self.config.chunk_ceiling);
        let mut audio: Vec<u8> = Vec::new();

        for (index, chunk) in chunks.iter().enumerate() {
            debug!(index, total = chunks.len(), "requesting fallback audio chunk");
            let response = self
                .client
                .get(&self.config.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", self.config.locale.as_str()),
                    ("client", "tw-ob"),
                ])
                .send()
                .await
                .map_err(|e| {
                    SynthesisError::Network(format!("fallback chunk {index} request failed: {e}"))
                })?
                .error_for_status()
                .map_err(|e| {
                    SynthesisError::Network(format!("fallback chunk {index} rejected: {e}"))
                })?;

            let bytes = response.bytes().await.map_err(|e| {
                SynthesisError::Network(format!("fallback chunk {index} body read failed: {e}"))
            })?;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }
        Ok(audio)
    }
}
