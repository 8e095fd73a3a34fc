use super::{ActionDescriptor, ActionResult, Parameters};
use super::effects::ActionEffects;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of actions keyed by name
#[derive(Debug, Default)]
pub struct ActionRouter {
    /// Descriptors in registration order
    actions: RwLock<Vec<ActionDescriptor>>,
}

impl ActionRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router with the built-in actions registered
    pub fn with_builtins(effects: Arc<dyn ActionEffects>) -> Self {
        let router = Self::new();
        for descriptor in super::builtin::builtin_actions(effects) {
            router.register(descriptor);
        }
        router
    }

    /// Register an action, replacing any previous one with the same name
    pub fn register(&self, descriptor: ActionDescriptor) {
        let mut actions = self.actions.write();
        match actions.iter_mut().find(|a| a.name == descriptor.name) {
            Some(existing) => {
                info!("Replacing action: {}", descriptor.name);
                *existing = descriptor;
            }
            None => {
                debug!("Registered action: {}", descriptor.name);
                actions.push(descriptor);
            }
        }
    }

    /// Execute an action by name
    ///
    /// Unknown names produce a failed result without invoking anything.
    pub async fn execute(&self, name: &str, parameters: &Parameters) -> ActionResult {
        let handler = {
            let actions = self.actions.read();
            actions
                .iter()
                .find(|a| a.name == name)
                .map(|a| Arc::clone(&a.handler))
        };

        let Some(handler) = handler else {
            debug!("Unknown action requested: {}", name);
            return ActionResult::failure(format!("Unknown action: {}", name));
        };

        debug!("Executing action {} with {} parameter(s)", name, parameters.len());
        let result = handler.handle(parameters).await;
        debug!("Action {} finished: success={}", name, result.success);
        result
    }

    pub fn list(&self) -> Vec<ActionDescriptor> {
        self.actions.read().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.read().iter().any(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }
}
