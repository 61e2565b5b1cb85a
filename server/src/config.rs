// Configuration constants for the server

use std::time::Duration;

use tts_core::fallback::{
    DEFAULT_CHUNK_CEILING, DEFAULT_FALLBACK_ENDPOINT, DEFAULT_FALLBACK_LOCALE,
};
use tts_core::protocol::{DEFAULT_ENDPOINT, DEFAULT_LOCALE, DEFAULT_OUTPUT_FORMAT, DEFAULT_VOICE};
use tts_core::{FallbackConfig, SessionConfig, VoiceConfig};

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub synthesis_endpoint: String,
    pub synthesis_voice: String,
    pub synthesis_locale: String,
    pub synthesis_output_format: String,
    pub synthesis_timeout_secs: u64,
    pub fallback_endpoint: String,
    pub fallback_locale: String,
    pub fallback_chunk_ceiling: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            rate_limit_per_minute: 60,
            // Narration streams for up to 45s plus fallback time
            request_timeout_secs: 120,
            cors_allowed_origins: None,
            synthesis_endpoint: DEFAULT_ENDPOINT.to_string(),
            synthesis_voice: DEFAULT_VOICE.to_string(),
            synthesis_locale: DEFAULT_LOCALE.to_string(),
            synthesis_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            synthesis_timeout_secs: 45,
            fallback_endpoint: DEFAULT_FALLBACK_ENDPOINT.to_string(),
            fallback_locale: DEFAULT_FALLBACK_LOCALE.to_string(),
            fallback_chunk_ceiling: DEFAULT_CHUNK_CEILING,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        Self {
            port: env_or("PORT", defaults.port),
            rate_limit_per_minute: env_or("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            cors_allowed_origins,
            synthesis_endpoint: env_or("TTS_ENDPOINT", defaults.synthesis_endpoint),
            synthesis_voice: env_or("TTS_VOICE", defaults.synthesis_voice),
            synthesis_locale: env_or("TTS_LOCALE", defaults.synthesis_locale),
            synthesis_output_format: env_or("TTS_OUTPUT_FORMAT", defaults.synthesis_output_format),
            synthesis_timeout_secs: env_or("TTS_TIMEOUT_SECS", defaults.synthesis_timeout_secs),
            fallback_endpoint: env_or("FALLBACK_ENDPOINT", defaults.fallback_endpoint),
            fallback_locale: env_or("FALLBACK_LOCALE", defaults.fallback_locale),
            fallback_chunk_ceiling: env_or(
                "FALLBACK_CHUNK_CEILING",
                defaults.fallback_chunk_ceiling,
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Streaming session settings for the narration pipeline
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.synthesis_endpoint.clone(),
            voice: VoiceConfig {
                voice: self.synthesis_voice.clone(),
                locale: self.synthesis_locale.clone(),
                output_format: self.synthesis_output_format.clone(),
            },
            timeout: Duration::from_secs(self.synthesis_timeout_secs),
        }
    }

    /// Chunked fallback settings for the narration pipeline
    pub fn fallback_config(&self) -> FallbackConfig {
        FallbackConfig {
            endpoint: self.fallback_endpoint.clone(),
            locale: self.fallback_locale.clone(),
            chunk_ceiling: self.fallback_chunk_ceiling,
        }
    }
}
