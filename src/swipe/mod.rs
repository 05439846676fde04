// src/swipe/mod.rs
//! Swipe decision core: turns a drag gesture or a button press into an
//! Accept/Reject decision and walks a one-pass queue of candidate items.

pub mod engine;
pub mod queue;
pub mod session;

pub use engine::{DecisionEngine, DEFAULT_SWIPE_THRESHOLD};
pub use queue::{AcceptNotifier, Candidate, QueueController, SwipeOutcome};
pub use session::SwipeSession;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcome for one candidate item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwipeError {
    /// A decision arrived after the last item was already decided.
    #[error("queue exhausted: cursor {cursor} of {len}, no current item to decide")]
    InvalidState { cursor: usize, len: usize },
}
