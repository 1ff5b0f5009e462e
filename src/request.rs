use serde::Serialize;
use std::io::{self, Write};

use crate::config::Config;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const USER_PROMPT: &str = "What is 7 multiplied by 8?";
pub const MAX_TOKENS: u32 = 512;
pub const TEMPERATURE: u8 = 0;

pub const API_KEY_HEADER: &str = "api-key";
pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: u8,
}

impl Default for ChatCompletionRequest {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(USER_PROMPT)],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

pub fn chat_completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

/// The single request sent by a connectivity check.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub url: String,
    pub body: ChatCompletionRequest,
}

impl ChatRequest {
    pub fn new(cfg: &Config) -> Self {
        Self {
            url: chat_completions_url(&cfg.endpoint, &cfg.deployment, &cfg.api_version),
            body: ChatCompletionRequest::default(),
        }
    }

    /// Writes the method, URL, headers and body with the key redacted.
    pub fn describe(&self, out: &mut impl Write) -> io::Result<()> {
        let body = serde_json::to_string(&self.body).map_err(io::Error::other)?;
        writeln!(out, "POST {}", self.url)?;
        writeln!(
            out,
            "Headers: {{\"{}\": \"<redacted>\", \"Content-Type\": \"{}\"}}",
            API_KEY_HEADER, CONTENT_TYPE_JSON
        )?;
        writeln!(out, "Body: {body}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChatCompletionRequest, ChatRequest, chat_completions_url};
    use crate::config::Config;

    fn test_config() -> Config {
        Config {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: "super-secret".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2023-05-15".to_string(),
            timeout_secs: 30,
            verbose: true,
        }
    }

    #[test]
    fn chat_completions_url_trims_trailing_slash() {
        assert_eq!(
            chat_completions_url("https://example.openai.azure.com/", "gpt-4o", "2023-05-15"),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2023-05-15"
        );
        assert_eq!(
            chat_completions_url("https://example.openai.azure.com//", "gpt-4o", "2023-05-15"),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2023-05-15"
        );
    }

    #[test]
    fn body_serializes_to_fixed_prompt() {
        let body = serde_json::to_value(ChatCompletionRequest::default())
            .expect("body should serialize");

        assert_eq!(
            body,
            json!({
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "What is 7 multiplied by 8?"}
                ],
                "max_tokens": 512,
                "temperature": 0
            })
        );
    }

    #[test]
    fn temperature_is_sent_as_integer() {
        let body = serde_json::to_string(&ChatCompletionRequest::default())
            .expect("body should serialize");
        assert!(body.contains("\"temperature\":0}"), "{body}");
    }

    #[test]
    fn describe_redacts_api_key() {
        let cfg = test_config();
        let request = ChatRequest::new(&cfg);
        let mut out = Vec::new();
        request.describe(&mut out).expect("describe should write");
        let text = String::from_utf8(out).expect("output should be utf-8");

        assert!(text.starts_with(
            "POST https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2023-05-15\n"
        ));
        assert!(text.contains("\"api-key\": \"<redacted>\""), "{text}");
        assert!(text.contains("\"Content-Type\": \"application/json\""), "{text}");
        assert!(text.contains("What is 7 multiplied by 8?"), "{text}");
        assert!(!text.contains("super-secret"), "{text}");
    }
}
