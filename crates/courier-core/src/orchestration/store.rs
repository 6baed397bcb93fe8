//! Per-user conversation history
//!
//! The store is the only mutable shared state of the pipeline. It is created
//! empty at startup, owned by whoever builds the dialogue controller, and only
//! changed through the operations below.

use super::types::{Turn, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// History of one user, always starting with exactly one system turn
#[derive(Debug, Clone)]
pub struct UserSession {
    turns: Vec<Turn>,
    system_prompt: Arc<str>,
}

impl UserSession {
    fn new(system_prompt: Arc<str>) -> Self {
        Self {
            turns: vec![Turn::system(&*system_prompt)],
            system_prompt,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop everything but a fresh system turn
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::system(&*self.system_prompt));
    }
}

/// Lock guarding one user's session for the duration of a turn
pub type SessionHandle = Arc<Mutex<UserSession>>;

/// Conversation store keyed by user id
pub struct ConversationStore {
    sessions: RwLock<HashMap<UserId, SessionHandle>>,
    system_prompt: Arc<str>,
}

impl ConversationStore {
    /// Create an empty store using the default system prompt
    pub fn new() -> Self {
        Self::with_system_prompt(crate::config::default_system_prompt())
    }

    /// Create an empty store with a custom system turn
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let prompt: String = prompt.into();
        Self {
            sessions: RwLock::new(HashMap::new()),
            system_prompt: Arc::from(prompt),
        }
    }

    /// Get or create the session lock for a user
    pub fn session(&self, user_id: &UserId) -> SessionHandle {
        if let Some(handle) = self.sessions.read().get(user_id) {
            return handle.clone();
        }
        self.sessions
            .write()
            .entry(user_id.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(UserSession::new(self.system_prompt.clone())))
            })
            .clone()
    }

    /// History for a user, initialized on first contact
    pub async fn get(&self, user_id: &UserId) -> Vec<Turn> {
        self.session(user_id).lock().await.turns().to_vec()
    }

    /// Add a turn to the end of a user's history
    pub async fn append(&self, user_id: &UserId, turn: Turn) {
        self.session(user_id).lock().await.push(turn);
    }

    /// Replace a user's history with the default system turn
    pub async fn reset(&self, user_id: &UserId) {
        self.session(user_id).lock().await.reset();
    }

    /// Number of users seen so far
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[tokio::test]
    async fn test_get_initializes_with_system_turn() {
        let store = ConversationStore::with_system_prompt("be brief");
        let turns = store.get(&UserId::from("alice")).await;
        assert_eq!(turns, vec![Turn::system("be brief")]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_append_keeps_order() {
        let store = ConversationStore::new();
        let user = UserId::from("alice");
        store.append(&user, Turn::user("one")).await;
        store.append(&user, Turn::assistant("two")).await;
        let turns = store.get(&user).await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[1].content, "one");
        assert_eq!(turns[2].content, "two");
    }

    #[tokio::test]
    async fn test_reset_leaves_one_system_turn() {
        let store = ConversationStore::new();
        let user = UserId::from("bob");
        for i in 0..5 {
            store.append(&user, Turn::user(format!("msg {}", i))).await;
        }
        store.reset(&user).await;
        let turns = store.get(&user).await;
        assert_eq!(turns, vec![Turn::system(store.system_prompt())]);

        // Idempotent
        store.reset(&user).await;
        assert_eq!(store.get(&user).await.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_unknown_user_creates_session() {
        let store = ConversationStore::new();
        store.reset(&UserId::from("new")).await;
        assert_eq!(store.get(&UserId::from("new")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = ConversationStore::new();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        store.append(&alice, Turn::user("hi")).await;
        store.reset(&bob).await;
        assert_eq!(store.get(&alice).await.len(), 2);
        assert_eq!(store.get(&bob).await.len(), 1);
    }

    #[tokio::test]
    async fn test_same_handle_for_same_user() {
        let store = ConversationStore::new();
        let user = UserId::from("carol");
        let a = store.session(&user);
        let b = store.session(&user);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let store = Arc::new(ConversationStore::new());
        let user = UserId::from("dave");
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            let user = user.clone();
            handles.push(tokio::spawn(async move {
                store.append(&user, Turn::user(i.to_string())).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let turns = store.get(&user).await;
        assert_eq!(turns.len(), 21);
        assert_eq!(turns[0].role, Role::System);
    }
}
