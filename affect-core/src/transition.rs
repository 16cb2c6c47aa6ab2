//! Transition log records.
//!
//! Every state change appends one transition, independent of whether it also
//! produced a memory. Duration, smoothness, and resistance are fixed
//! placeholders today; the pathway milestones list is reserved for a future
//! interpolation pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::EmotionalState;

/// Placeholder transition duration.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);
/// Placeholder smoothness, 0–100.
pub const DEFAULT_SMOOTHNESS: u8 = 70;
/// Placeholder resistance, 0–100.
pub const DEFAULT_RESISTANCE: u8 = 30;

/// One recorded state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalTransition {
    /// State before the change.
    pub from_state: EmotionalState,
    /// State after the change.
    pub to_state: EmotionalState,
    /// What caused the change, in free text.
    pub trigger: String,
    /// When the change was committed.
    pub timestamp: DateTime<Utc>,
    /// How long the shift nominally takes.
    pub duration: Duration,
    /// How gradual the shift is, 0–100.
    pub smoothness: u8,
    /// How much the character resists the shift, 0–100.
    pub resistance: u8,
    /// Magnitude of the shift: `|Δ composite intensity| · 10`.
    pub intensity: u8,
    /// Intermediate milestone states. Currently always empty.
    pub pathway: Vec<EmotionalState>,
}

impl EmotionalTransition {
    /// Record a transition between two states.
    #[must_use]
    pub fn new(
        from_state: EmotionalState,
        to_state: EmotionalState,
        trigger: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let delta = from_state.intensity.abs_diff(to_state.intensity);
        Self {
            from_state,
            to_state,
            trigger: trigger.into(),
            timestamp,
            duration: DEFAULT_DURATION,
            smoothness: DEFAULT_SMOOTHNESS,
            resistance: DEFAULT_RESISTANCE,
            intensity: delta.saturating_mul(10),
            pathway: Vec::new(),
        }
    }

    /// Absolute composite-intensity delta of this transition.
    #[must_use]
    pub fn intensity_delta(&self) -> u8 {
        self.from_state.intensity.abs_diff(self.to_state.intensity)
    }
}
