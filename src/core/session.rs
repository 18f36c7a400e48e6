//! # Chat Sessions
//!
//! The transcript shown in the browser UI. A session is display state only:
//! the agent answers every question in a fresh context and never sees it.
//!
//! Sessions live in memory. The store keeps at most [`MAX_SESSIONS`] of them
//! and drops the least recently updated one to make room for a new one.

use std::collections::HashMap;

use chrono::Utc;
use log::debug;
use serde::Serialize;

use crate::inference::{ContextSegment, Source};

/// First assistant message of every session.
pub const GREETING: &str = "👋 Hello! I'm your Math AI assistant. I can help you with algebra, \
geometry, trigonometry, statistics, sequences, logarithms, and more!\n\n\
Ask me any math question, and I'll solve it step-by-step to help you prepare for your exams.";

/// Appended to every failure shown to the user.
pub const RETRY_HINT: &str = "Please try again with a different question.";

/// Canned questions offered in the UI sidebar.
pub const EXAMPLE_QUESTIONS: [&str; 6] = [
    "Solve 2*x + 5 = 13",
    "Find the area of a circle with radius 5",
    "Calculate sin(30)",
    "What is the mean of [10, 20, 30, 40, 50]?",
    "Solve quadratic equation: a=1, b=-5, c=6",
    "Find the 10th term of arithmetic sequence: first=5, difference=3",
];

/// Sessions kept in memory before the stalest is evicted.
pub const MAX_SESSIONS: usize = 1000;

/// Generate a new UUID v4 session ID.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Text shown in place of an answer when answering failed.
pub fn failure_message(error: &dyn std::fmt::Display) -> String {
    format!("❌ Error: {error}\n\n{RETRY_HINT}")
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatSession {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub messages: Vec<ContextSegment>,
}

impl ChatSession {
    pub fn new(id: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id,
            created_at: now,
            updated_at: now,
            messages: vec![greeting()],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Source::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Source::Model, content.into());
    }

    fn push(&mut self, source: Source, content: String) {
        self.messages.push(ContextSegment { source, content });
        self.updated_at = Utc::now().timestamp();
    }

    /// Drops the conversation back to the greeting.
    pub fn clear(&mut self) {
        self.messages = vec![greeting()];
        self.updated_at = Utc::now().timestamp();
    }
}

/// Bounded in-memory session map.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, ChatSession>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.get_mut(id)
    }

    /// The session with this id, created (evicting if full) when missing.
    pub fn get_or_create(&mut self, id: &str) -> &mut ChatSession {
        if !self.sessions.contains_key(id) {
            self.make_room();
        }
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| ChatSession::new(id.to_string()))
    }

    fn make_room(&mut self) {
        while self.sessions.len() >= self.capacity {
            let stalest = self
                .sessions
                .values()
                .min_by_key(|s| (s.updated_at, s.created_at))
                .map(|s| s.id.clone());
            let Some(id) = stalest else { break };
            debug!("Evicting session {}", id);
            self.sessions.remove(&id);
        }
    }
}

fn greeting() -> ContextSegment {
    ContextSegment {
        source: Source::Model,
        content: GREETING.to_string(),
    }
}
