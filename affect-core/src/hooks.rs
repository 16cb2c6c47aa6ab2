//! External collaborator seams and the engine's outbound event.
//!
//! The engine consumes these interfaces; it never owns their implementations.
//! The character directory is the only collaborator allowed to suspend on
//! I/O, and it is consulted exactly once per character (first access).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{CharacterId, EmotionalState};
use crate::update::NeedSnapshot;

/// Topic state-change events are published on.
pub const STATE_TOPIC: &str = "affect.state_changed";

/// Minimal character record returned by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRef {
    /// The character's id.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
}

/// The external character directory.
///
/// Consulted lazily, once per character, before the engine creates a default
/// state. A `None` answer is fatal for the triggering call.
#[async_trait]
pub trait CharacterDirectory: Send + Sync {
    /// Look a character up by id.
    async fn lookup(&self, character: CharacterId) -> Option<CharacterRef>;
}

/// The external needs component.
#[async_trait]
pub trait NeedsSource: Send + Sync {
    /// Current need snapshots for a character.
    async fn active_needs(&self, character: CharacterId) -> Vec<NeedSnapshot>;
}

/// Outbound event sink.
///
/// Publishing is fire-and-forget from the engine's point of view: a failed
/// publish is logged and swallowed, never rolled back into state.
pub trait EventSink: Send + Sync {
    /// Deliver one event on a topic.
    ///
    /// # Errors
    /// Implementations report delivery failure; the engine logs it and
    /// continues.
    fn publish(&self, topic: &str, event: &StateChanged) -> crate::error::Result<()>;
}

/// Which pathway produced a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Message-analysis pathway.
    MessageAnalysis,
    /// Direct update pathway.
    Direct,
    /// Need-frustration pathway.
    NeedPressure,
    /// Explicit normalization.
    Normalize,
}

/// Payload published on every committed state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChanged {
    /// Whose state changed.
    pub character: CharacterId,
    /// State before the change.
    pub old_state: EmotionalState,
    /// State after the change.
    pub new_state: EmotionalState,
    /// What caused it, in free text.
    pub trigger: String,
    /// Which pathway committed it.
    pub source: UpdateSource,
}
