use crate::actions::ActionResult;
use crate::llm::LlmResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// What produced an assistant turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnMetadata {
    /// A pattern-matched intent executed directly
    Action { action: String, result: ActionResult },

    /// A plain model reply
    Model { response: LlmResponse },

    /// A model reply that asked for an action
    ModelAction {
        response: LlmResponse,
        action: String,
        result: ActionResult,
    },
}

impl TurnMetadata {
    /// Name of the action this turn ran, if any
    pub fn action(&self) -> Option<&str> {
        match self {
            TurnMetadata::Action { action, .. } | TurnMetadata::ModelAction { action, .. } => {
                Some(action)
            }
            TurnMetadata::Model { .. } => None,
        }
    }

    /// Result of the action this turn ran, if any
    pub fn action_result(&self) -> Option<&ActionResult> {
        match self {
            TurnMetadata::Action { result, .. } | TurnMetadata::ModelAction { result, .. } => {
                Some(result)
            }
            TurnMetadata::Model { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub content: String,
    pub metadata: Option<TurnMetadata>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: generate_id(&timestamp),
            timestamp,
            role,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: TurnMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Millisecond timestamp prefix plus a random suffix
fn generate_id(timestamp: &DateTime<Utc>) -> String {
    format!(
        "{:x}-{}",
        timestamp.timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_turn_ids_are_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| Turn::new(Role::User, "hi").id)
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_metadata_accessors() {
        let metadata = TurnMetadata::Action {
            action: "calculate".to_string(),
            result: ActionResult::ok("2 + 2 = 4"),
        };
        assert_eq!(metadata.action(), Some("calculate"));
        assert!(metadata.action_result().unwrap().success);
    }

    #[test]
    fn test_metadata_serializes_with_tag() {
        let metadata = TurnMetadata::Action {
            action: "get_weather".to_string(),
            result: ActionResult::ok("stub"),
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["kind"], "action");
        assert_eq!(json["action"], "get_weather");
    }
}
