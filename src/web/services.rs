// src/web/services.rs
//! Per-seeker swipe sessions and the Accept notifier that turns decisions
//! into applications.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::Database;
use crate::database::ApplicationRepository;
use crate::error::DataStoreError;
use crate::session::SessionEvent;
use crate::swipe::{AcceptNotifier, SwipeSession};
use crate::types::JobCard;
use crate::web::types::SwipeState;

/// Offer ids whose application is still being written.
type InFlight = Arc<std::sync::Mutex<HashSet<String>>>;

/// Records a pending application for every accepted card, off the request
/// path. Failures are logged; the queue has already moved on.
pub struct ApplicationRecorder {
    db: Database,
    seeker_id: String,
    in_flight: InFlight,
}

impl ApplicationRecorder {
    pub fn new(db: Database, seeker_id: impl Into<String>) -> Self {
        Self::with_in_flight(db, seeker_id, InFlight::default())
    }

    fn with_in_flight(db: Database, seeker_id: impl Into<String>, in_flight: InFlight) -> Self {
        Self {
            db,
            seeker_id: seeker_id.into(),
            in_flight,
        }
    }

    /// Accepted offers not yet recorded. A new queue must leave them out.
    pub fn in_flight(&self) -> HashSet<String> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn spawn_record(&self, job_offer_id: &str) -> Option<JoinHandle<Result<bool, DataStoreError>>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("Cannot record application for {}: {}", job_offer_id, e);
                return None;
            }
        };

        let db = self.db.clone();
        let seeker_id = self.seeker_id.clone();
        let job_offer_id = job_offer_id.to_string();
        let in_flight = self.in_flight.clone();
        in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_offer_id.clone());

        Some(handle.spawn(async move {
            let result = ApplicationRepository::new(db.pool())
                .record(&job_offer_id, &seeker_id)
                .await;
            if let Err(e) = &result {
                error!(
                    "Failed to record application of {} to {}: {}",
                    seeker_id, job_offer_id, e
                );
            }
            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&job_offer_id);
            result
        }))
    }
}

impl AcceptNotifier for ApplicationRecorder {
    fn notify_accept(&self, item_id: &str) {
        // Detached. The join handle only matters in tests.
        let _ = self.spawn_record(item_id);
    }
}

/// Live swipe sessions keyed by seeker id.
#[derive(Clone, Default)]
pub struct SwipeSessions {
    inner: Arc<Mutex<HashMap<String, SwipeSession<JobCard>>>>,
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
}

impl SwipeSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept notifier for a seeker. Every recorder of the same seeker sees
    /// the same in-flight set, so a restarted queue skips offers whose
    /// application is still being written.
    pub async fn recorder(&self, db: Database, seeker_id: &str) -> ApplicationRecorder {
        let in_flight = self
            .in_flight
            .lock()
            .await
            .entry(seeker_id.to_string())
            .or_default()
            .clone();
        ApplicationRecorder::with_in_flight(db, seeker_id, in_flight)
    }

    /// Replace any session the seeker had with a fresh one.
    pub async fn start(&self, seeker_id: &str, session: SwipeSession<JobCard>) -> SwipeState {
        let state = state_of(&session);
        if self
            .inner
            .lock()
            .await
            .insert(seeker_id.to_string(), session)
            .is_some()
        {
            debug!("Replaced swipe session of {}", seeker_id);
        }
        state
    }

    /// Run `f` against the seeker's session; `None` when there is none.
    pub async fn with_session<R>(
        &self,
        seeker_id: &str,
        f: impl FnOnce(&mut SwipeSession<JobCard>) -> R,
    ) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        sessions.get_mut(seeker_id).map(f)
    }

    pub async fn discard(&self, seeker_id: &str) -> bool {
        // Running record tasks keep their own handle on the set.
        self.in_flight.lock().await.remove(seeker_id);
        self.inner.lock().await.remove(seeker_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Drop a seeker's queue as soon as they sign out. Runs until the
    /// session hub goes away.
    pub fn follow_sign_outs(&self, mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
        let sessions = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::SignedOut { user_id }) => {
                        if sessions.discard(&user_id).await {
                            info!("Discarded swipe queue of signed-out user {}", user_id);
                        }
                    }
                    Ok(SessionEvent::SignedIn(_)) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Session listener skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

pub fn state_of(session: &SwipeSession<JobCard>) -> SwipeState {
    let queue = session.queue();
    SwipeState {
        card: session.current().cloned(),
        cursor: queue.cursor(),
        total: queue.len(),
        remaining: queue.remaining(),
        exhausted: queue.is_exhausted(),
    }
}
