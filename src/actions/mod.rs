//! Local actions the assistant can execute
//!
//! - **registry**: name → descriptor map and execution
//! - **builtin**: the default action set (URLs, search, timers, math, stubs)
//! - **calculator**: arithmetic expression parser used by `calculate`
//! - **effects**: side-effect boundary (opening URLs, notifications)

pub mod builtin;
pub mod calculator;
pub mod effects;
pub mod registry;

pub use effects::{ActionEffects, LogEffects};
pub use registry::ActionRouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Action parameters keyed by name
pub type Parameters = Map<String, Value>;

/// Outcome of one action invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Handler behind a registered action
///
/// Handlers are total: bad input is reported as a failed [`ActionResult`],
/// never as a panic or error.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, parameters: &Parameters) -> ActionResult;
}

#[async_trait]
impl<F> ActionHandler for F
where
    F: Fn(&Parameters) -> ActionResult + Send + Sync,
{
    async fn handle(&self, parameters: &Parameters) -> ActionResult {
        self(parameters)
    }
}

/// A named, registered capability
#[derive(Clone)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    /// Declared parameter names, in order
    pub parameters: Vec<String>,
    pub handler: Arc<dyn ActionHandler>,
}

impl ActionDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: &[&str],
        handler: impl ActionHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            handler: Arc::new(handler),
        }
    }
}

impl std::fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Read a parameter as text, accepting strings and numbers
pub fn text_param(parameters: &Parameters, key: &str) -> Option<String> {
    match parameters.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
