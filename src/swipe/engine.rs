// src/swipe/engine.rs
//! Gesture-to-decision mapping.

use tracing::debug;

use super::Decision;

/// Horizontal release offset, in pointer units, a card must exceed to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 100.0;

/// Maps a finished drag (or an explicit command) to a [`Decision`].
///
/// The engine never touches the queue. The only state it carries is whether a
/// gesture is currently in flight, and that flag is cleared as soon as the
/// gesture ends, so the same engine can be reused for every card.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    threshold: f64,
    gesture_in_progress: bool,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl DecisionEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            gesture_in_progress: false,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn gesture_in_progress(&self) -> bool {
        self.gesture_in_progress
    }

    /// Pointer went down on the card.
    pub fn begin_gesture(&mut self) {
        self.gesture_in_progress = true;
    }

    /// Pointer released with the given total horizontal offset.
    ///
    /// Returns `None` when the offset stays within `[-threshold, threshold]`:
    /// the gesture is cancelled and the card stays current. NaN never
    /// compares past the threshold, so it cancels too.
    pub fn report_gesture_end(&mut self, total_horizontal_offset: f64) -> Option<Decision> {
        self.gesture_in_progress = false;

        let decision = if total_horizontal_offset > self.threshold {
            Some(Decision::Accept)
        } else if total_horizontal_offset < -self.threshold {
            Some(Decision::Reject)
        } else {
            None
        };

        debug!(
            offset = total_horizontal_offset,
            threshold = self.threshold,
            decision = ?decision,
            "Gesture ended"
        );
        decision
    }

    /// Button press: no measurement, the decision goes straight through.
    pub fn decide(&mut self, explicit: Decision) -> Decision {
        self.gesture_in_progress = false;
        explicit
    }
}
