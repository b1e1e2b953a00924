use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::models::Session;
use crate::services::ai::LlmProvider;
use crate::services::retrieval::Retriever;

pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub retriever: Box<dyn Retriever>,
    pub sessions: tokio::sync::Mutex<HashMap<String, SharedSession>>,
}

impl AppState {
    pub async fn create_session(&self, greeting: &str) -> (String, SharedSession) {
        let session = Session::with_greeting(greeting);
        let id = session.id.clone();
        let shared = Arc::new(tokio::sync::Mutex::new(session));

        let mut sessions = self.sessions.lock().await;
        self.prune_expired(&mut sessions);
        sessions.insert(id.clone(), Arc::clone(&shared));
        tracing::info!(session = %id, active = sessions.len(), "session started");
        (id, shared)
    }

    pub async fn get_session(&self, id: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        self.prune_expired(&mut sessions);
        sessions.get(id).cloned()
    }

    pub async fn end_session(&self, id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session ended");
        }
        removed
    }

    // Sessions locked by an in-flight turn are skipped.
    fn prune_expired(&self, sessions: &mut HashMap<String, SharedSession>) {
        let now = Utc::now().naive_utc();
        let ttl = self.config.session_ttl_minutes;
        sessions.retain(|id, session| match session.try_lock() {
            Ok(s) if s.is_expired(now, ttl) => {
                tracing::info!(session = %id, "session expired");
                false
            }
            _ => true,
        });
    }
}
