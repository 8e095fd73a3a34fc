pub mod storage;
pub mod types;

pub use storage::{DialogStore, MAX_HISTORY_LENGTH};
pub use types::{Role, Turn, TurnMetadata};
