pub mod actions;
pub mod integration;
pub mod intent;
pub mod llm;
pub mod messages;
pub mod speech;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JarvisError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Action error: {0}")]
    Action(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Assistant is busy processing another request")]
    Busy,

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl From<reqwest::Error> for JarvisError {
    fn from(e: reqwest::Error) -> Self {
        JarvisError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for JarvisError {
    fn from(e: serde_json::Error) -> Self {
        JarvisError::Llm(format!("Malformed model payload: {}", e))
    }
}

impl JarvisError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Transport problems fall back to canned replies
            JarvisError::Llm(_) => true,
            JarvisError::Http(_) => true,
            JarvisError::Speech(_) => true,
            JarvisError::Action(_) => true,
            JarvisError::Config(_) => false,
            JarvisError::Channel(_) => false,
            // The next input will be accepted once the current one finishes
            JarvisError::Busy => true,
            JarvisError::Pipeline(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            JarvisError::Llm(_) | JarvisError::Http(_) => {
                "The language model is unavailable. Falling back to basic replies.".to_string()
            }
            JarvisError::Speech(_) => {
                "Speech output failed. The response is shown as text.".to_string()
            }
            JarvisError::Action(_) => "The requested action could not be completed.".to_string(),
            JarvisError::Config(_) => "Configuration error. Please check settings.".to_string(),
            JarvisError::Channel(_) => {
                "Internal communication error. Please restart the assistant.".to_string()
            }
            JarvisError::Busy => "Still working on the previous request.".to_string(),
            JarvisError::Pipeline(_) => {
                "I apologize, but I encountered an error processing your request.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, JarvisError>;
