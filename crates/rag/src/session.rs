//! Per-session chat history.
//!
//! The store keeps every turn for the life of the process; readers ask for
//! the most recent window. The lock is only held for the duration of a read
//! or an append, never while a backend call is in flight.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last `n` turns of a session, oldest first. Unknown sessions are empty.
    pub async fn recent(&self, session_id: &str, n: usize) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|turns| turns[turns.len().saturating_sub(n)..].to_vec())
            .unwrap_or_default()
    }

    /// Append a completed turn, creating the session if needed.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
    }

    /// Number of turns stored for a session.
    pub async fn turn_count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map_or(0, Vec::len)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn recent_returns_last_n_in_order() {
        let store = SessionStore::new();
        for i in 0..6 {
            store
                .append("s1", Turn::new(format!("q{i}"), format!("a{i}")))
                .await;
        }
        let recent = store.recent("s1", 4).await;
        let users: Vec<&str> = recent.iter().map(|t| t.user.as_str()).collect();
        assert_eq!(users, vec!["q2", "q3", "q4", "q5"]);
        assert_eq!(store.turn_count("s1").await, 6);
    }

    #[tokio::test]
    async fn short_and_unknown_sessions() {
        let store = SessionStore::new();
        store.append("s1", Turn::new("q", "a")).await;
        assert_eq!(store.recent("s1", 4).await.len(), 1);
        assert!(store.recent("nope", 4).await.is_empty());
        assert!(store.recent("s1", 0).await.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_and_clearable() {
        let store = SessionStore::new();
        store.append("a", Turn::new("1", "1")).await;
        store.append("b", Turn::new("2", "2")).await;
        assert_eq!(store.session_count().await, 2);
        assert_eq!(store.recent("a", 4).await[0].user, "1");

        store.clear().await;
        assert_eq!(store.session_count().await, 0);
        assert_eq!(store.turn_count("a").await, 0);
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let store = Arc::new(SessionStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append("shared", Turn::new(format!("q{i}"), "a"))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.turn_count("shared").await, 32);
    }
}
