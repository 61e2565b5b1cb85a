//! Outbound frame builders for the streaming narration service.

use serde_json::json;
use uuid::Uuid;

/// Consumer read-aloud endpoint with its trusted client token
pub const DEFAULT_ENDPOINT: &str = "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1?TrustedClientToken=6A5AA1D4EAFF4E9FB37E23D68491D6F4";
pub const DEFAULT_VOICE: &str = "bn-BD-PradeepNeural";
pub const DEFAULT_LOCALE: &str = "bn-BD";
pub const DEFAULT_OUTPUT_FORMAT: &str = "audio-24khz-96kbitrate-mono-mp3";

/// Voice selection and audio format for one synthesis request
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub voice: String,
    pub locale: String,
    pub output_format: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }
}

/// Fresh request id in the format the service expects: 32 hex chars, no dashes
pub fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Escape text for embedding in an SSML document
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// First outbound frame: selects the audio output format and enables word
/// boundary metadata (sentence boundaries stay off)
pub fn speech_config_frame(voice: &VoiceConfig) -> String {
    let body = json!({
        "context": {
            "synthesis": {
                "audio": {
                    "metadataoptions": {
                        "sentenceBoundaryEnabled": "false",
                        "wordBoundaryEnabled": "true"
                    },
                    "outputFormat": voice.output_format
                }
            }
        }
    });
    format!("Content-Type:application/json; charset=utf-8\r\nPath:speech.config\r\n\r\n{body}")
}

/// Second outbound frame: the SSML document naming the target voice with
/// neutral prosody
pub fn ssml_frame(request_id: &str, voice: &VoiceConfig, text: &str) -> String {
    format!(
        "X-RequestId:{request_id}\r\nContent-Type:application/ssml+xml\r\nPath:ssml\r\n\r\n\
         <speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'>\
         <voice name='{}'><prosody pitch='+0Hz' rate='+0%' volume='+0%'>{}</prosody></voice></speak>",
        voice.locale,
        voice.voice,
        escape_xml(text)
    )
}
