use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;
use tts_core::ScriptProvider;

pub const DEFAULT_API_URL: &str = "https://api.z.ai/api/paas/v4/chat/completions";
pub const DEFAULT_MODEL: &str = "GLM-4.5-AirX";

/// Upstream provider rejects very long prompts; chapter text is truncated
/// to this many characters before it is sent.
const SCRIPT_INPUT_CEILING: usize = 2000;

/// Narration scriptwriter persona. The script is spoken aloud, so the
/// prompt asks for a continuous Bengali narrative with no markup.
const SYSTEM_PROMPT: &str = "তুমি বাংলাদেশের মাধ্যমিক শ্রেণির শিক্ষার্থীদের জন্য একজন বন্ধুসুলভ শিক্ষক। \
পাঠ্যবইয়ের বিষয়বস্তুকে সহজ, গল্পের মতো করে ব্যাখ্যা করো। \
শুধুমাত্র বাংলায় একটানা ২৫০-৪০০ শব্দের একটি অডিও স্ক্রিপ্ট লেখো; \
কোনো শিরোনাম, তালিকা বা অতিরিক্ত নোট দেবে না।";

/// Structure for the chat completions request
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    thinking: Thinking,
    temperature: f32,
}

#[derive(Serialize)]
struct Thinking {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Structure for the chat completions response
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Chat-completions client that turns chapter text into a narration script
pub struct ScriptClient {
    api_key: String,
    api_url: String,
    model: String,
    client: Client,
}

impl ScriptClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    /// Create a client from the environment. `GLM_KEY` is required;
    /// `SCRIPT_API_URL` and `SCRIPT_MODEL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GLM_KEY").context("GLM_KEY must be set in the environment")?;
        let mut client = Self::new(api_key);
        if let Ok(url) = env::var("SCRIPT_API_URL") {
            client.api_url = url;
        }
        if let Ok(model) = env::var("SCRIPT_MODEL") {
            client.model = model;
        }
        Ok(client)
    }

    /// Generate a narration script for one chapter excerpt
    pub async fn generate(&self, text: &str, chapter_title: &str) -> Result<String> {
        let user_message = build_user_message(text, chapter_title);
        let req_body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &user_message,
                },
            ],
            thinking: Thinking { kind: "disabled" },
            temperature: 0.8,
        };

        debug!(model = %self.model, "requesting narration script");
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await
            .context("script request failed")?
            .error_for_status()
            .context("script provider rejected the request")?
            .json::<ChatResponse>()
            .await
            .context("script response was not valid JSON")?;

        let script = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default();
        if script.trim().is_empty() {
            anyhow::bail!("script provider returned no content");
        }
        Ok(script)
    }
}

#[async_trait]
impl ScriptProvider for ScriptClient {
    async fn generate_script(&self, text: &str, chapter_title: &str) -> Result<String> {
        self.generate(text, chapter_title).await
    }
}

fn build_user_message(text: &str, chapter_title: &str) -> String {
    let title = if chapter_title.trim().is_empty() {
        "বিজ্ঞান"
    } else {
        chapter_title
    };
    format!(
        "অধ্যায়: {title}\nপাঠ্যবইয়ের বিষয়বস্তু:\n{}",
        truncate_chars(text, SCRIPT_INPUT_CEILING)
    )
}

/// Truncate on a character boundary (chapter text is mostly multi-byte Bengali)
fn truncate_chars(text: &str, ceiling: usize) -> &str {
    match text.char_indices().nth(ceiling) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 2000), "hello");
    }

    #[test]
    fn test_truncate_chars_counts_chars_not_bytes() {
        let text = "সালাম".repeat(1000); // 5000 chars, 15000 bytes
        let truncated = truncate_chars(&text, 2000);
        assert_eq!(truncated.chars().count(), 2000);
    }

    #[test]
    fn test_user_message_defaults_chapter_title() {
        let msg = build_user_message("content", "  ");
        assert!(msg.starts_with("অধ্যায়: বিজ্ঞান\n"));
        let msg = build_user_message("content", "পদার্থবিজ্ঞান");
        assert!(msg.starts_with("অধ্যায়: পদার্থবিজ্ঞান\n"));
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"স্ক্রিপ্ট"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "স্ক্রিপ্ট");
    }

    #[test]
    fn test_request_serialization_shape() {
        let req = ChatRequest {
            model: "m",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            thinking: Thinking { kind: "disabled" },
            temperature: 0.8,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["thinking"]["type"], "disabled");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
