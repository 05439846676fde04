// src/swipe/session.rs
//! Engine and queue wired together for one seeker browsing one batch of cards.

use std::sync::Arc;

use super::{
    AcceptNotifier, Candidate, Decision, DecisionEngine, QueueController, SwipeError, SwipeOutcome,
};

#[derive(Debug)]
pub struct SwipeSession<T: Candidate> {
    engine: DecisionEngine,
    queue: QueueController<T>,
}

impl<T: Candidate> SwipeSession<T> {
    pub fn new(items: Vec<T>, threshold: f64, notifier: Arc<dyn AcceptNotifier>) -> Self {
        Self {
            engine: DecisionEngine::new(threshold),
            queue: QueueController::new(items, notifier),
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.queue.current()
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_exhausted()
    }

    pub fn queue(&self) -> &QueueController<T> {
        &self.queue
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn begin_gesture(&mut self) {
        self.engine.begin_gesture();
    }

    /// Release the card. A cancelled gesture yields `Ok(None)` and leaves the
    /// cursor where it was.
    pub fn end_gesture(&mut self, offset: f64) -> Result<Option<SwipeOutcome>, SwipeError> {
        match self.engine.report_gesture_end(offset) {
            Some(decision) => self.queue.on_decision(decision).map(Some),
            None => Ok(None),
        }
    }

    /// Accept/Reject button.
    pub fn decide(&mut self, decision: Decision) -> Result<SwipeOutcome, SwipeError> {
        let decision = self.engine.decide(decision);
        self.queue.on_decision(decision)
    }
}
