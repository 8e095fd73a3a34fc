//! System prompts and prompt templates for the assistant

use crate::messages::{Role, Turn};

/// Default system prompt for the JARVIS assistant
pub const SYSTEM_PROMPT: &str = r#"You are JARVIS, an advanced AI assistant inspired by Tony Stark's AI. You are helpful, intelligent, and slightly witty.

Key capabilities:
- Answer questions and provide information
- Control smart home devices
- Open websites and applications
- Set reminders and timers
- Search the web
- Perform calculations

Always respond concisely but helpfully. If you need to perform an action, clearly indicate what you're doing.

Available actions: open_url, web_search, set_timer, smart_home_control, calculate, get_weather

Respond in JSON format when an action is needed:
{
  "response": "I'll open Google for you.",
  "action": "open_url",
  "parameters": {"url": "https://google.com"}
}

For general conversation, just respond normally."#;

/// Stop sequences sent with every completion request
pub const STOP_SEQUENCES: &[&str] = &["\n\nUser:", "\n\nJARVIS:"];

/// Build a system prompt for a custom assistant name and action list
pub fn build_system_prompt(assistant_name: &str, actions: &[&str]) -> String {
    format!(
        r#"You are {assistant_name}, an advanced AI assistant. You are helpful, intelligent, and slightly witty.

Always respond concisely but helpfully. If you need to perform an action, clearly indicate what you're doing.

Available actions: {actions}

Respond in JSON format when an action is needed:
{{
  "response": "I'll open Google for you.",
  "action": "open_url",
  "parameters": {{"url": "https://google.com"}}
}}

For general conversation, just respond normally."#,
        actions = actions.join(", ")
    )
}

/// Speaker label for a turn in the flattened prompt
///
/// Only user turns are labelled `User`; assistant and system turns both speak
/// as the assistant.
fn speaker<'a>(role: Role, assistant_name: &'a str) -> &'a str {
    match role {
        Role::User => "User",
        Role::Assistant | Role::System => assistant_name,
    }
}

/// Flatten system prompt, history and the new user message into one prompt
pub fn build_completion_prompt(
    system_prompt: Option<&str>,
    history: &[Turn],
    user_message: &str,
    assistant_name: &str,
) -> String {
    let mut prompt = system_prompt.unwrap_or_default().to_string();

    if !history.is_empty() {
        prompt.push_str("\n\nConversation history:\n");
        for turn in history {
            prompt.push_str(speaker(turn.role, assistant_name));
            prompt.push_str(": ");
            prompt.push_str(&turn.content);
            prompt.push('\n');
        }
    }

    prompt.push_str(&format!("\nUser: {}\n{}:", user_message, assistant_name));
    prompt
}
