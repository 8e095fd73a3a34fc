//! Language model access
//!
//! - **config**: endpoint, sampling and timeout settings
//! - **prompts**: system prompt and flattened completion prompt
//! - **providers**: HTTP completion provider and the canned fallback responder
//! - **client**: ordered provider chain and provider state
//! - **response**: request/response types and action-response parsing
//!
//! # Usage
//!
//! ```rust,ignore
//! use jarvis::llm::{parse_action_response, LlmClient, LlmConfig, LlmRequest};
//!
//! let client = LlmClient::new(LlmConfig::default())?;
//! let reply = client.query(&LlmRequest::new("Hello!")).await?;
//! let parsed = parse_action_response(&reply.text);
//! if let Some(action) = parsed.suggested_action {
//!     // route to the action registry
//! }
//! ```

pub mod client;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod response;

pub use client::LlmClient;
pub use config::{LlmConfig, DEFAULT_ENDPOINT};
pub use prompts::{build_completion_prompt, build_system_prompt, STOP_SEQUENCES, SYSTEM_PROMPT};
pub use providers::{CompletionPayload, CompletionProvider, FallbackResponder, HttpCompletionProvider};
pub use response::{
    parse_action_response, LlmRequest, LlmResponse, ModelResponse, ProviderKind, ProviderState,
};
