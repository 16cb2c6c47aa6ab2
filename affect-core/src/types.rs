//! Core type definitions for the affect engine.
//!
//! All durable types are serializable so any store can back the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a character tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new random character ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an emotional memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an active emotional impact in a character's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImpactId(pub Uuid);

impl ImpactId {
    /// Create a new random impact ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImpactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImpactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Emotion Taxonomy
// ---------------------------------------------------------------------------

/// Closed taxonomy of emotions the engine tracks.
///
/// Upstream components hand the engine free-text labels; those parse through
/// [`Emotion::from_label`] with an explicit [`Emotion::Neutral`] fallback, so
/// an unrecognized label can never produce an unhandled branch downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// Baseline state; also the fallback for unrecognized labels.
    Neutral,
    /// Happiness, delight.
    Joy,
    /// High-arousal positive anticipation.
    Excitement,
    /// Low-arousal positive calm.
    Contentment,
    /// Engaged interest in something novel.
    Curiosity,
    /// Unhappiness, grief.
    Sadness,
    /// Feeling disconnected from others.
    Loneliness,
    /// Under-stimulated disengagement.
    Boredom,
    /// Hostile displeasure.
    Anger,
    /// Blocked-goal irritation.
    Frustration,
    /// Aversion, revulsion.
    Disgust,
    /// Perceived threat.
    Fear,
    /// Diffuse worry without a concrete threat.
    Anxiety,
    /// Reaction to the unexpected.
    Surprise,
}

/// Manifestation family an emotion belongs to.
///
/// The behavioral lookup tables are keyed by family, not by individual
/// emotion, so every variant resolves to exactly one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionFamily {
    /// Positive, approach-oriented emotions.
    Joy,
    /// Low-energy withdrawal emotions.
    Sadness,
    /// Confrontational, high-energy negative emotions.
    Anger,
    /// Threat-avoidance emotions.
    Fear,
    /// No strong pull in any direction.
    Neutral,
}

impl Emotion {
    /// Human-readable lowercase label, used in descriptions and memory tags.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Joy => "joy",
            Self::Excitement => "excitement",
            Self::Contentment => "contentment",
            Self::Curiosity => "curiosity",
            Self::Sadness => "sadness",
            Self::Loneliness => "loneliness",
            Self::Boredom => "boredom",
            Self::Anger => "anger",
            Self::Frustration => "frustration",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Anxiety => "anxiety",
            Self::Surprise => "surprise",
        }
    }

    /// Parse a free-text label from an upstream component.
    ///
    /// Matching is case-insensitive and tolerates surrounding whitespace.
    /// Anything unrecognized (including the empty string) is `Neutral`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "joy" | "happy" | "happiness" => Self::Joy,
            "excitement" | "excited" => Self::Excitement,
            "contentment" | "content" | "calm" => Self::Contentment,
            "curiosity" | "curious" | "interest" => Self::Curiosity,
            "sadness" | "sad" | "grief" => Self::Sadness,
            "loneliness" | "lonely" => Self::Loneliness,
            "boredom" | "bored" => Self::Boredom,
            "anger" | "angry" | "rage" => Self::Anger,
            "frustration" | "frustrated" => Self::Frustration,
            "disgust" | "disgusted" => Self::Disgust,
            "fear" | "afraid" | "scared" => Self::Fear,
            "anxiety" | "anxious" | "worry" | "worried" => Self::Anxiety,
            "surprise" | "surprised" | "shock" => Self::Surprise,
            _ => Self::Neutral,
        }
    }

    /// The manifestation family this emotion belongs to.
    #[must_use]
    pub fn family(self) -> EmotionFamily {
        match self {
            Self::Joy | Self::Excitement | Self::Contentment | Self::Curiosity => {
                EmotionFamily::Joy
            }
            Self::Sadness | Self::Loneliness | Self::Boredom => EmotionFamily::Sadness,
            Self::Anger | Self::Frustration | Self::Disgust => EmotionFamily::Anger,
            Self::Fear | Self::Anxiety => EmotionFamily::Fear,
            Self::Neutral | Self::Surprise => EmotionFamily::Neutral,
        }
    }

    /// Canonical opposite of this emotion, if one exists.
    ///
    /// Used by the association builder to classify contrast links.
    #[must_use]
    pub fn opposite(self) -> Option<Self> {
        match self {
            Self::Joy => Some(Self::Sadness),
            Self::Sadness => Some(Self::Joy),
            Self::Excitement => Some(Self::Boredom),
            Self::Boredom => Some(Self::Excitement),
            Self::Anger => Some(Self::Contentment),
            Self::Contentment => Some(Self::Anger),
            Self::Fear => Some(Self::Curiosity),
            Self::Curiosity => Some(Self::Fear),
            Self::Anxiety => Some(Self::Contentment),
            Self::Neutral
            | Self::Loneliness
            | Self::Frustration
            | Self::Disgust
            | Self::Surprise => None,
        }
    }

    /// Whether `self` and `other` form a known opposite pair (in either
    /// direction — `opposite()` is not symmetric for every variant).
    #[must_use]
    pub fn is_opposite_of(self, other: Self) -> bool {
        self.opposite() == Some(other) || other.opposite() == Some(self)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Emotional State
// ---------------------------------------------------------------------------

/// The composite emotional state of one character.
///
/// Exactly one live instance exists per character. It is overwritten whole on
/// every transition — callers never mutate individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Dominant emotion.
    pub primary: Emotion,
    /// Second-ranked emotion, if any impact besides the dominant is active.
    pub secondary: Option<Emotion>,
    /// Composite intensity on the 1–10 scale.
    pub intensity: u8,
    /// Derived human-readable description ("strong joy, tinged with anxiety").
    pub description: String,
}

impl EmotionalState {
    /// Build a state, clamping intensity to [1, 10].
    #[must_use]
    pub fn new(
        primary: Emotion,
        secondary: Option<Emotion>,
        intensity: u8,
        description: impl Into<String>,
    ) -> Self {
        Self {
            primary,
            secondary,
            intensity: intensity.clamp(1, 10),
            description: description.into(),
        }
    }

    /// The neutral baseline state every character starts from.
    #[must_use]
    pub fn neutral(baseline_intensity: u8) -> Self {
        Self::new(
            Emotion::Neutral,
            None,
            baseline_intensity,
            "at an even keel",
        )
    }
}

// ---------------------------------------------------------------------------
// Situational Context
// ---------------------------------------------------------------------------

/// Social setting a stimulus occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialSetting {
    /// Alone, or one-on-one with a trusted party.
    Private,
    /// Close company — family, partner.
    Intimate,
    /// Small familiar group.
    Group,
    /// Open or anonymous company.
    Public,
}

impl SocialSetting {
    /// Lowercase label for descriptions and memory tags.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Intimate => "intimate",
            Self::Group => "group",
            Self::Public => "public",
        }
    }
}

/// Coarse time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// Roughly 05:00–12:00.
    Morning,
    /// Roughly 12:00–17:00.
    Afternoon,
    /// Roughly 17:00–22:00.
    Evening,
    /// Roughly 22:00–05:00.
    Night,
}

impl TimeOfDay {
    /// Lowercase label for descriptions and memory tags.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

/// Immutable snapshot of the situation surrounding a stimulus.
///
/// Attached to impacts, memories, and transitions at creation time and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalContext {
    /// Where the stimulus happened, socially.
    pub social_setting: SocialSetting,
    /// Relationship closeness with the counterpart, 0–100.
    pub relationship_level: u8,
    /// Coarse time of day.
    pub time_of_day: TimeOfDay,
    /// Free-form situational note from the caller.
    pub situation: String,
}

impl EmotionalContext {
    /// Build a context snapshot, clamping the relationship level to [0, 100].
    #[must_use]
    pub fn new(
        social_setting: SocialSetting,
        relationship_level: u8,
        time_of_day: TimeOfDay,
        situation: impl Into<String>,
    ) -> Self {
        Self {
            social_setting,
            relationship_level: relationship_level.min(100),
            time_of_day,
            situation: situation.into(),
        }
    }
}

impl Default for EmotionalContext {
    fn default() -> Self {
        Self {
            social_setting: SocialSetting::Private,
            relationship_level: 50,
            time_of_day: TimeOfDay::Afternoon,
            situation: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Intensity Bands
// ---------------------------------------------------------------------------

/// Qualitative band for a 0–100 intensity total.
///
/// Shared by the composite description builder and memory tagging.
#[must_use]
pub fn intensity_band(total: f32) -> &'static str {
    if total <= 20.0 {
        "slight"
    } else if total <= 40.0 {
        "moderate"
    } else if total <= 60.0 {
        "noticeable"
    } else if total <= 80.0 {
        "strong"
    } else {
        "very strong"
    }
}

// ---------------------------------------------------------------------------
// Introspection
// ---------------------------------------------------------------------------

/// Lightweight per-character counters for dashboards and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterStats {
    /// Impacts currently decaying in the ledger.
    pub active_impacts: usize,
    /// Emotional memories stored.
    pub memories: usize,
    /// Transition records kept (bounded by config).
    pub transitions: usize,
}
