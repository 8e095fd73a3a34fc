//! Integration layer
//!
//! Wires the dialog store, intent extraction, action routing, the LLM client and
//! speech output into the assistant turn pipeline.

mod config;
mod orchestrator;

pub use config::{AssistantConfig, DEFAULT_CONTEXT_TURNS};
pub use orchestrator::{
    InputOutcome, Orchestrator, OrchestratorBuilder, APOLOGY, GREETING, WAKE_PROMPT,
};
