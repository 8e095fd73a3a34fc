//! Request and response types shared by the LLM providers

use crate::actions::Parameters;
use crate::messages::Turn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Local,
    Cloud,
    #[default]
    Fallback,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Cloud => "cloud",
            ProviderKind::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection status published by the LLM client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderState {
    pub connected: bool,
    pub active_provider: ProviderKind,
}

/// One completion request
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    /// The user's message
    pub prompt: String,

    /// Recent turns, oldest first
    pub history: Vec<Turn>,

    pub system_prompt: Option<String>,

    /// Overrides the configured token limit
    pub max_tokens: Option<u32>,

    /// Overrides the configured temperature
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Raw completion text and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl LlmResponse {
    pub fn new(text: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            text: text.into(),
            provider,
            model: None,
        }
    }
}

/// Model output split into reply text and an optional action request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelResponse {
    pub text: String,
    pub suggested_action: Option<String>,
    pub suggested_parameters: Option<Parameters>,
}

/// Interpret model output that may be a JSON action request or plain prose
///
/// A JSON object may carry `response` (reply text), `action` (action name) and
/// `parameters` (object). Anything that is not a JSON object is returned as
/// plain text with no suggested action.
pub fn parse_action_response(raw: &str) -> ModelResponse {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(raw.trim()) else {
        return ModelResponse {
            text: raw.to_string(),
            ..Default::default()
        };
    };

    let text = match object.remove("response") {
        Some(Value::String(text)) if !text.is_empty() => text,
        _ => raw.to_string(),
    };
    let suggested_action = match object.remove("action") {
        Some(Value::String(action)) if !action.trim().is_empty() => Some(action.trim().to_string()),
        _ => None,
    };
    let suggested_parameters = match object.remove("parameters") {
        Some(Value::Object(parameters)) => Some(parameters),
        _ => None,
    };

    ModelResponse {
        text,
        suggested_action,
        suggested_parameters,
    }
}
