use chrono::{Duration, NaiveDateTime, Utc};

use crate::models::{Appointment, UserProfile};
use crate::services::ai::Message;

/// Everything one conversation knows. Each session owns its profile and
/// appointment; nothing is shared between sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub profile: UserProfile,
    pub appointment: Appointment,
    pub history: Vec<Message>,
    pub created_at: NaiveDateTime,
    pub last_activity: NaiveDateTime,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profile: UserProfile::default(),
            appointment: Appointment::default(),
            history: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn with_greeting(greeting: &str) -> Self {
        let mut session = Self::new();
        session.history.push(Message::assistant(greeting));
        session
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now().naive_utc();
    }

    pub fn is_expired(&self, now: NaiveDateTime, ttl_minutes: i64) -> bool {
        now - self.last_activity > Duration::minutes(ttl_minutes)
    }

    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.history.push(Message::user(user));
        self.history.push(Message::assistant(assistant));
        self.touch();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
