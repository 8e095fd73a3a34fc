//! Completion providers
//!
//! The client walks an ordered list of providers until one answers. The HTTP
//! provider talks to a local model server; the fallback responder is a fixed
//! table of canned replies that always answers.

use super::config::LlmConfig;
use super::prompts::{build_completion_prompt, STOP_SEQUENCES};
use super::response::{LlmRequest, LlmResponse, ProviderKind};
use crate::Result;
use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Reply used when the server answers without any completion text
pub const EMPTY_COMPLETION_REPLY: &str =
    "I apologize, but I encountered an error processing your request.";

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Body of a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

/// Provider backed by an HTTP completion endpoint
pub struct HttpCompletionProvider {
    config: LlmConfig,
    client: reqwest::Client,
    kind: ProviderKind,
}

impl HttpCompletionProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            config,
            client,
            kind: ProviderKind::Local,
        })
    }

    /// Report replies as coming from a different provider kind
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build the request body for a completion request
    pub fn payload(&self, request: &LlmRequest) -> CompletionPayload {
        CompletionPayload {
            prompt: build_completion_prompt(
                request.system_prompt.as_deref(),
                &request.history,
                &request.prompt,
                &self.config.assistant_name,
            ),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// One-shot reachability check against `{endpoint}/health`
    pub async fn check_health(&self) -> Result<()> {
        self.client
            .get(self.config.health_url())
            .timeout(self.config.health_timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let payload = self.payload(request);
        debug!(
            "POST {} ({} prompt chars)",
            self.config.endpoint,
            payload.prompt.len()
        );

        let body: Value = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(LlmResponse {
            text: completion_text(&body),
            provider: self.kind,
            model: body.get("model").and_then(Value::as_str).map(str::to_string),
        })
    }
}

/// Pull completion text out of `choices[0].text` or `response`
fn completion_text(body: &Value) -> String {
    body.pointer("/choices/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .or_else(|| body.get("response").and_then(Value::as_str).filter(|t| !t.is_empty()))
        .unwrap_or(EMPTY_COMPLETION_REPLY)
        .to_string()
}

enum Reply {
    Fixed(&'static str),
    CurrentTime,
    CurrentDate,
}

/// Canned replies keyed by trigger substrings, checked in order
const CANNED_REPLIES: &[(&str, Reply)] = &[
    (
        "hello",
        Reply::Fixed("Hello! I'm JARVIS, your AI assistant. How may I help you today?"),
    ),
    ("hi", Reply::Fixed("Hello! How can I assist you?")),
    (
        "how are you",
        Reply::Fixed("I'm functioning optimally, thank you for asking. How may I assist you?"),
    ),
    (
        "what can you do",
        Reply::Fixed("I can help you with web searches, opening websites, setting timers, controlling smart home devices, performing calculations, and answering questions. What would you like to do?"),
    ),
    (
        "thank you",
        Reply::Fixed("You're welcome! Is there anything else I can help you with?"),
    ),
    (
        "goodbye",
        Reply::Fixed("Goodbye! Feel free to call on me anytime you need assistance."),
    ),
    ("what time is it", Reply::CurrentTime),
    ("what date is it", Reply::CurrentDate),
];

/// Deterministic rule-based responder used when no model is reachable
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackResponder;

impl FallbackResponder {
    pub fn respond(&self, prompt: &str) -> String {
        let lower = prompt.to_lowercase();

        let matched = CANNED_REPLIES
            .iter()
            .find(|(trigger, _)| lower.contains(trigger))
            .map(|(_, reply)| reply);

        match matched {
            Some(Reply::Fixed(reply)) => reply.to_string(),
            Some(Reply::CurrentTime) => {
                format!("The current time is {}.", Local::now().format("%-I:%M:%S %p"))
            }
            Some(Reply::CurrentDate) => {
                format!("Today is {}.", Local::now().format("%A, %B %-d, %Y"))
            }
            None => format!(
                "I understand you're asking about \"{}\". While I don't have specific information about that right now, I'm here to help with web searches, opening websites, timers, and basic assistance. What would you like me to do?",
                prompt
            ),
        }
    }
}

#[async_trait]
impl CompletionProvider for FallbackResponder {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fallback
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        Ok(LlmResponse::new(
            self.respond(&request.prompt),
            ProviderKind::Fallback,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Role, Turn};
    use serde_json::json;

    #[test]
    fn test_fallback_hello_is_deterministic() {
        let responder = FallbackResponder;
        let first = responder.respond("Hello there");
        assert_eq!(
            first,
            "Hello! I'm JARVIS, your AI assistant. How may I help you today?"
        );
        assert_eq!(responder.respond("Hello there"), first);
    }

    #[test]
    fn test_fallback_trigger_order() {
        let responder = FallbackResponder;
        // "hi" appears inside "this", and is checked before "thank you"
        assert_eq!(
            responder.respond("thank you for this"),
            "Hello! How can I assist you?"
        );
        assert_eq!(
            responder.respond("Goodbye"),
            "Goodbye! Feel free to call on me anytime you need assistance."
        );
    }

    #[test]
    fn test_fallback_time_and_date() {
        let responder = FallbackResponder;
        assert!(responder.respond("what time is it").starts_with("The current time is "));
        assert!(responder.respond("What date is it?").starts_with("Today is "));
    }

    #[test]
    fn test_fallback_default_echoes_prompt() {
        let reply = FallbackResponder.respond("Quantum Foam");
        assert!(reply.contains("\"Quantum Foam\""));
        assert!(reply.contains("web searches"));
    }

    #[test]
    fn test_completion_text_sources() {
        assert_eq!(
            completion_text(&json!({ "choices": [{ "text": " Hi." }] })),
            " Hi."
        );
        assert_eq!(completion_text(&json!({ "response": "Hey" })), "Hey");
        assert_eq!(completion_text(&json!({})), EMPTY_COMPLETION_REPLY);
    }

    #[test]
    fn test_payload_uses_request_overrides() {
        let provider = HttpCompletionProvider::new(LlmConfig::default()).unwrap();
        let request = LlmRequest {
            prompt: "Hi".to_string(),
            history: vec![Turn::new(Role::User, "Hi")],
            system_prompt: Some("Sys".to_string()),
            max_tokens: Some(10),
            temperature: None,
        };

        let payload = provider.payload(&request);
        assert_eq!(payload.max_tokens, 10);
        assert_eq!(payload.temperature, 0.7);
        assert_eq!(payload.stop, vec!["\n\nUser:", "\n\nJARVIS:"]);
        assert!(payload.prompt.starts_with("Sys\n\nConversation history:\nUser: Hi\n"));
        assert!(payload.prompt.ends_with("\nUser: Hi\nJARVIS:"));
    }
}
