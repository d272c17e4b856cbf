//! Conversation thread log
//!
//! Threads are append-only lists of messages keyed by an opaque id.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::llm::Message;

pub trait ThreadLog: Send + Sync {
    /// Append a turn to a thread, creating the thread if needed
    fn add_turn(&self, thread_id: &str, message: Message);

    /// All turns of a thread in insertion order; empty for unknown ids
    fn get_thread(&self, thread_id: &str) -> Vec<Message>;
}

#[derive(Debug, Default)]
pub struct InMemoryThreadLog {
    threads: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemoryThreadLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh thread id
    pub fn new_thread(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        if let Ok(mut threads) = self.threads.write() {
            threads.insert(id.clone(), Vec::new());
        }
        id
    }
}

impl ThreadLog for InMemoryThreadLog {
    fn add_turn(&self, thread_id: &str, message: Message) {
        match self.threads.write() {
            Ok(mut threads) => threads
                .entry(thread_id.to_string())
                .or_default()
                .push(message),
            Err(_) => tracing::warn!(thread_id, "Thread log lock poisoned, turn dropped"),
        }
    }

    fn get_thread(&self, thread_id: &str) -> Vec<Message> {
        self.threads
            .read()
            .ok()
            .and_then(|threads| threads.get(thread_id).cloned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_in_order() {
        let log = InMemoryThreadLog::new();
        let id = log.new_thread();
        assert!(log.get_thread(&id).is_empty());

        log.add_turn(&id, Message::user("first"));
        log.add_turn(&id, Message::assistant("second"));

        let turns = log.get_thread(&id);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "first");
        assert_eq!(turns[1].content, "second");
        assert!(log.get_thread("missing").is_empty());
    }
}
