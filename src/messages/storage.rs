use super::types::{Role, Turn, TurnMetadata};
use crate::utils::Broadcast;
use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use tracing::debug;

/// Default number of turns kept in memory
pub const MAX_HISTORY_LENGTH: usize = 20;

/// Bounded, append-only dialog history
///
/// Every mutation publishes a full snapshot of the history, so observers
/// always see a complete and ordered sequence.
#[derive(Debug)]
pub struct DialogStore {
    turns: RwLock<VecDeque<Turn>>,
    max_turns: usize,
    system_prompt: RwLock<String>,
    history: Broadcast<Vec<Turn>>,
    context: Broadcast<Map<String, Value>>,
}

impl DialogStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_capacity(system_prompt, MAX_HISTORY_LENGTH)
    }

    pub fn with_capacity(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        Self {
            turns: RwLock::new(VecDeque::with_capacity(max_turns + 1)),
            max_turns: max_turns.max(1),
            system_prompt: RwLock::new(system_prompt.into()),
            history: Broadcast::new(Vec::new()),
            context: Broadcast::new(Map::new()),
        }
    }

    pub fn append(
        &self,
        role: Role,
        content: impl Into<String>,
        metadata: Option<TurnMetadata>,
    ) -> Turn {
        let mut turn = Turn::new(role, content);
        turn.metadata = metadata;

        let mut turns = self.turns.write();
        turns.push_back(turn.clone());
        while turns.len() > self.max_turns {
            turns.pop_front();
        }
        debug!("Recorded {} turn ({} in history)", role.as_str(), turns.len());
        self.history.publish(turns.iter().cloned().collect());

        turn
    }

    pub fn add_user(&self, content: impl Into<String>) -> Turn {
        self.append(Role::User, content, None)
    }

    pub fn add_assistant(
        &self,
        content: impl Into<String>,
        metadata: Option<TurnMetadata>,
    ) -> Turn {
        self.append(Role::Assistant, content, metadata)
    }

    pub fn add_system(&self, content: impl Into<String>) -> Turn {
        self.append(Role::System, content, None)
    }

    /// Last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let turns = self.turns.read();
        let start = turns.len().saturating_sub(n);
        turns.iter().skip(start).cloned().collect()
    }

    pub fn all(&self) -> Vec<Turn> {
        self.turns.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.read().is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Drop all turns and record that the history was reset
    pub fn clear(&self) {
        {
            let mut turns = self.turns.write();
            turns.clear();
            self.history.publish(Vec::new());
        }
        self.add_system("Conversation history cleared.");
    }

    pub fn system_prompt(&self) -> String {
        self.system_prompt.read().clone()
    }

    pub fn set_system_prompt(&self, prompt: impl Into<String>) {
        *self.system_prompt.write() = prompt.into();
    }

    /// Subscribe to history snapshots
    pub fn subscribe(&self) -> Receiver<Vec<Turn>> {
        self.history.subscribe()
    }

    pub fn context(&self) -> Map<String, Value> {
        self.context.get()
    }

    /// Shallow-merge `updates` into the conversation context
    pub fn update_context(&self, updates: Map<String, Value>) {
        self.context.update(|context| context.extend(updates));
    }

    pub fn subscribe_context(&self) -> Receiver<Map<String, Value>> {
        self.context.subscribe()
    }
}

impl Default for DialogStore {
    fn default() -> Self {
        Self::new(crate::llm::prompts::SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_is_capped() {
        let store = DialogStore::default();
        for n in 1..=45 {
            store.add_user(format!("Message {}", n));
            assert_eq!(store.len(), n.min(MAX_HISTORY_LENGTH));
        }

        let all = store.all();
        assert_eq!(all.first().unwrap().content, "Message 26");
        assert_eq!(all.last().unwrap().content, "Message 45");
        for pair in all.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let store = DialogStore::default();
        for i in 0..10 {
            store.add_user(format!("Message {}", i));
        }

        let recent = store.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "Message 7");
        assert_eq!(recent[2].content, "Message 9");
        assert_eq!(store.recent(50).len(), 10);
    }

    #[test]
    fn test_clear_leaves_system_notice() {
        let store = DialogStore::default();
        store.add_user("Hello");
        store.add_assistant("Hi", None);

        store.clear();

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].role, Role::System);
        assert_eq!(all[0].content, "Conversation history cleared.");
    }

    #[test]
    fn test_every_mutation_publishes_full_snapshot() {
        let store = DialogStore::default();
        let rx = store.subscribe();
        store.add_user("one");
        store.add_assistant("two", None);

        let snapshots: Vec<Vec<Turn>> = rx.try_iter().collect();
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots[0].is_empty());
        assert_eq!(snapshots[1].len(), 1);
        assert_eq!(snapshots[2].len(), 2);
        assert_eq!(snapshots[2][1].content, "two");
    }

    #[test]
    fn test_clear_publishes_empty_then_notice() {
        let store = DialogStore::default();
        store.add_user("one");
        let rx = store.subscribe();
        store.clear();

        let snapshots: Vec<Vec<Turn>> = rx.try_iter().collect();
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots[1].is_empty());
        assert_eq!(snapshots[2].len(), 1);
    }

    #[test]
    fn test_system_prompt_round_trip() {
        let store = DialogStore::new("first");
        assert_eq!(store.system_prompt(), "first");
        store.set_system_prompt("second");
        assert_eq!(store.system_prompt(), "second");
    }

    #[test]
    fn test_context_merge() {
        let store = DialogStore::default();
        let mut first = Map::new();
        first.insert("location".to_string(), json!("Berlin"));
        store.update_context(first);

        let mut second = Map::new();
        second.insert("units".to_string(), json!("metric"));
        store.update_context(second);

        let context = store.context();
        assert_eq!(context["location"], "Berlin");
        assert_eq!(context["units"], "metric");
    }
}
