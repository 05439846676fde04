// src/session.rs
//! In-process identity/session provider. Request guards sign users in as
//! their tokens are verified; logout signs them out. Interested parties
//! subscribe to the change stream for the lifetime of the process.

use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::types::Session;

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut { user_id: String },
}

impl SessionEvent {
    pub fn user_id(&self) -> &str {
        match self {
            SessionEvent::SignedIn(session) => &session.user.id,
            SessionEvent::SignedOut { user_id } => user_id,
        }
    }
}

#[derive(Debug)]
pub struct SessionHub {
    sessions: RwLock<HashMap<String, Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Session of `user_id`, if signed in and not expired.
    pub async fn current_session(&self, user_id: &str) -> Option<Session> {
        let now = chrono::Utc::now().timestamp();
        self.sessions
            .read()
            .await
            .get(user_id)
            .filter(|s| s.expires_at > now)
            .cloned()
    }

    /// Record a verified session. Only a new or changed session produces an
    /// event, so repeated requests with the same token stay quiet. Other
    /// sessions that have expired by now are signed out on the way.
    pub async fn sign_in(&self, session: Session) {
        let now = chrono::Utc::now().timestamp();
        let (changed, expired) = {
            let mut sessions = self.sessions.write().await;
            let expired: Vec<String> = sessions
                .iter()
                .filter(|(user_id, s)| **user_id != session.user.id && s.expires_at <= now)
                .map(|(user_id, _)| user_id.clone())
                .collect();
            for user_id in &expired {
                sessions.remove(user_id);
            }

            let changed = sessions.get(&session.user.id) != Some(&session);
            if changed {
                sessions.insert(session.user.id.clone(), session.clone());
            }
            (changed, expired)
        };

        for user_id in expired {
            info!("Session expired for user {}", user_id);
            self.publish(SessionEvent::SignedOut { user_id });
        }

        if changed {
            info!("Session started for user {}", session.user.id);
            self.publish(SessionEvent::SignedIn(session));
        }
    }

    /// Returns `false` when the user had no session.
    pub async fn sign_out(&self, user_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(user_id).is_some();
        if removed {
            info!("Session ended for user {}", user_id);
            self.publish(SessionEvent::SignedOut {
                user_id: user_id.to_string(),
            });
        }
        removed
    }

    /// Subscribe to session changes from now on. The stream lasts as long as
    /// the hub; a subscriber that falls behind skips the oldest events.
    pub fn on_session_change(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error.
        if self.events.send(event).is_err() {
            debug!("Session event dropped, no subscribers");
        }
    }
}
