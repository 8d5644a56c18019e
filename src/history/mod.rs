use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::llm::ConversationTurn;

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

#[derive(Debug)]
struct Session {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    turns: Vec<ConversationTurn>,
    /// Held for the whole of a turn so turns on one session never overlap.
    turn_lock: Arc<Mutex<()>>,
}

impl Session {
    fn info(&self, id: &str) -> SessionInfo {
        SessionInfo {
            id: id.to_string(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.turns.len(),
        }
    }
}

/// Per-session conversation transcripts, held in memory only.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_session(&self) -> SessionInfo {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let session = Session {
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
            turn_lock: Arc::new(Mutex::new(())),
        };
        let info = session.info(&id);
        self.sessions.write().await.insert(id, session);
        info
    }

    pub async fn get_session(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|session| session.info(session_id))
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<SessionInfo> = sessions
            .iter()
            .map(|(id, session)| session.info(id))
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    pub async fn get_history(&self, session_id: &str) -> Option<Vec<ConversationTurn>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|session| session.turns.clone())
    }

    /// Runs one conversation turn against the session transcript.
    ///
    /// `turn` receives the current transcript and returns its result together
    /// with the extended transcript, which replaces the stored one. Turns on
    /// the same session run one at a time; readers are never blocked. Returns
    /// `None` if the session does not exist. A session deleted while its turn
    /// runs stays deleted.
    pub async fn with_turn<F, Fut, R>(
        &self,
        session_id: &str,
        turn: F,
    ) -> Option<(R, Vec<ConversationTurn>)>
    where
        F: FnOnce(Vec<ConversationTurn>) -> Fut,
        Fut: Future<Output = (R, Vec<ConversationTurn>)>,
    {
        let turn_lock = self.sessions.read().await.get(session_id)?.turn_lock.clone();
        let _guard = turn_lock.lock().await;

        let history = self.get_history(session_id).await?;
        let (result, transcript) = turn(history).await;

        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.turns = transcript.clone();
            session.updated_at = Utc::now();
        }
        Some((result, transcript))
    }

    pub async fn delete_session(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    type EchoTurn = std::future::Ready<(usize, Vec<ConversationTurn>)>;

    fn echo_turn(message: &'static str) -> impl FnOnce(Vec<ConversationTurn>) -> EchoTurn {
        move |mut history| {
            let seen = history.len();
            history.push(ConversationTurn::user(message));
            history.push(ConversationTurn::assistant("Namaste"));
            std::future::ready((seen, history))
        }
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let store = SessionStore::new();
        let info = store.create_session().await;
        assert_eq!(info.message_count, 0);
        assert_eq!(store.get_history(&info.id).await, Some(Vec::new()));

        let (seen, transcript) = store.with_turn(&info.id, echo_turn("hi")).await.unwrap();
        assert_eq!(seen, 0);
        assert_eq!(store.get_history(&info.id).await, Some(transcript));
        assert_eq!(store.get_session(&info.id).await.unwrap().message_count, 2);

        assert!(store.delete_session(&info.id).await);
        assert!(!store.delete_session(&info.id).await);
        assert!(store.get_session(&info.id).await.is_none());
        assert!(store.with_turn(&info.id, echo_turn("late")).await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create_session().await;
        let b = store.create_session().await;
        assert_ne!(a.id, b.id);

        store.with_turn(&a.id, echo_turn("vata")).await.unwrap();
        assert_eq!(store.get_history(&b.id).await.unwrap().len(), 0);
        assert_eq!(store.list_sessions().await.len(), 2);
    }

    #[tokio::test]
    async fn overlapping_turns_see_each_others_transcript() {
        let store = SessionStore::new();
        let id = store.create_session().await.id;

        let slow_turn = |message: &'static str| {
            move |mut history: Vec<ConversationTurn>| async move {
                let seen = history.len();
                tokio::time::sleep(Duration::from_millis(50)).await;
                history.push(ConversationTurn::user(message));
                history.push(ConversationTurn::assistant("ok"));
                (seen, history)
            }
        };

        let (first, second) = tokio::join!(
            store.with_turn(&id, slow_turn("first")),
            store.with_turn(&id, slow_turn("second")),
        );
        let mut seen = vec![first.unwrap().0, second.unwrap().0];
        seen.sort();
        assert_eq!(seen, vec![0, 2]);

        let history = store.get_history(&id).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].content, "ok");
    }
}
