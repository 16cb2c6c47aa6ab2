//! Error types for the affect engine.

use thiserror::Error;

/// Top-level error type for all engine operations.
#[derive(Error, Debug)]
pub enum AffectError {
    /// Character absent from the external directory. Fatal for the
    /// triggering call; never retried by the engine.
    #[error("Character not found: {0}")]
    CharacterNotFound(crate::CharacterId),

    /// The event sink rejected a publish. Update pathways catch and log
    /// this — it never rolls back a state change.
    #[error("Event publish failed on topic '{topic}': {reason}")]
    EventPublish {
        /// Topic the publish was addressed to.
        topic: String,
        /// Sink-reported failure reason.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AffectError>;
