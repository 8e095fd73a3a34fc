//! Configuration for the integration layer
//!
//! Provides centralized configuration for all components.

use crate::intent::DEFAULT_WAKE_WORDS;
use crate::llm::LlmConfig;
use crate::messages::MAX_HISTORY_LENGTH;
use crate::{JarvisError, Result};

/// Number of recent turns sent to the model with each query
pub const DEFAULT_CONTEXT_TURNS: usize = 6;

/// Configuration for the complete assistant
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// LLM configuration
    pub llm: LlmConfig,

    /// Phrases that gate voice input
    pub wake_words: Vec<String>,

    /// Maximum turns kept in the dialog history
    pub history_cap: usize,

    /// Recent turns included in model prompts
    pub context_turns: usize,

    /// Overrides the default system prompt
    pub system_prompt: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            wake_words: DEFAULT_WAKE_WORDS.iter().map(|w| w.to_string()).collect(),
            history_cap: MAX_HISTORY_LENGTH,
            context_turns: DEFAULT_CONTEXT_TURNS,
            system_prompt: None,
        }
    }
}

impl AssistantConfig {
    /// Build a configuration from `JARVIS_*` environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("JARVIS_LLM_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }
        if let Some(max_tokens) = lookup("JARVIS_MAX_TOKENS") {
            config.llm.max_tokens = max_tokens.trim().parse().map_err(|_| {
                JarvisError::Config(format!("JARVIS_MAX_TOKENS is not a number: {}", max_tokens))
            })?;
        }
        if let Some(temperature) = lookup("JARVIS_TEMPERATURE") {
            config.llm.temperature = temperature.trim().parse().map_err(|_| {
                JarvisError::Config(format!(
                    "JARVIS_TEMPERATURE is not a number: {}",
                    temperature
                ))
            })?;
        }
        if let Some(name) = lookup("JARVIS_ASSISTANT_NAME") {
            config.llm.assistant_name = name;
        }
        if let Some(words) = lookup("JARVIS_WAKE_WORDS") {
            config.wake_words = words
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the LLM configuration
    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    /// Replace the wake phrases
    pub fn with_wake_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wake_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Set the history cap
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    /// Set how many recent turns go into model prompts
    pub fn with_context_turns(mut self, turns: usize) -> Self {
        self.context_turns = turns;
        self
    }

    /// Use a custom system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.llm.endpoint).map_err(|e| {
            JarvisError::Config(format!("Invalid LLM endpoint {}: {}", self.llm.endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(JarvisError::Config(format!(
                "LLM endpoint must use http or https: {}",
                self.llm.endpoint
            )));
        }

        if self.history_cap == 0 {
            return Err(JarvisError::Config("History cap must be positive".to_string()));
        }

        if self.wake_words.iter().all(|w| w.trim().is_empty()) {
            return Err(JarvisError::Config(
                "At least one wake word is required".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(JarvisError::Config(format!(
                "Temperature out of range: {}",
                self.llm.temperature
            )));
        }

        Ok(())
    }
}
