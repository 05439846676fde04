// src/swipe/queue.rs
//! One-pass queue of candidate items.

use std::sync::Arc;
use tracing::{debug, info};

use super::{Decision, SwipeError};

/// Anything that can sit in a swipe queue. Only the identifier matters to the
/// queue; the rest of the item is display payload.
pub trait Candidate {
    fn candidate_id(&self) -> &str;
}

/// Receives Accept decisions.
///
/// Fire-and-forget: the queue does not wait for the notification to finish
/// and does not undo the cursor move if it later fails.
pub trait AcceptNotifier: Send + Sync {
    fn notify_accept(&self, item_id: &str);
}

/// What happened to the item that was current when a decision arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeOutcome {
    pub item_id: String,
    pub decision: Decision,
    pub cursor: usize,
    pub exhausted: bool,
}

pub struct QueueController<T: Candidate> {
    items: Vec<T>,
    cursor: usize,
    notifier: Arc<dyn AcceptNotifier>,
}

impl<T: Candidate> std::fmt::Debug for QueueController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueController")
            .field("len", &self.items.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<T: Candidate> QueueController<T> {
    pub fn new(items: Vec<T>, notifier: Arc<dyn AcceptNotifier>) -> Self {
        info!("Loaded swipe queue with {} items", items.len());
        Self {
            items,
            cursor: 0,
            notifier,
        }
    }

    /// Item under the cursor, `None` once every item has been decided.
    pub fn current(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.items.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    /// Apply a decision to the current item and move on to the next one.
    pub fn on_decision(&mut self, decision: Decision) -> Result<SwipeOutcome, SwipeError> {
        let item_id = match self.items.get(self.cursor) {
            Some(item) => item.candidate_id().to_string(),
            None => {
                return Err(SwipeError::InvalidState {
                    cursor: self.cursor,
                    len: self.items.len(),
                })
            }
        };

        if decision == Decision::Accept {
            self.notifier.notify_accept(&item_id);
        }

        self.cursor += 1;
        debug!(
            item_id = %item_id,
            decision = %decision,
            cursor = self.cursor,
            "Queue advanced"
        );

        Ok(SwipeOutcome {
            item_id,
            decision,
            cursor: self.cursor,
            exhausted: self.is_exhausted(),
        })
    }
}
