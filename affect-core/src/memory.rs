//! Episodic emotional memories and the association graph between them.
//!
//! Memories are append-only: once created, only their association list grows.
//! Every new memory is compared pairwise against the character's existing
//! memories; sufficiently similar pairs get a typed, weighted edge in both
//! directions.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::config::AssociationConfig;
use crate::types::{
    intensity_band, CharacterId, Emotion, EmotionalContext, EmotionalState, MemoryId,
    SocialSetting,
};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// How two memories relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    /// Close together in time — part of one episode.
    Sequence,
    /// Opposite primary emotions.
    Contrast,
    /// Same social setting.
    Contextual,
    /// Related by overall similarity.
    Similarity,
}

/// A weighted, typed link from one memory to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryAssociation {
    /// The memory this link points at.
    pub target: MemoryId,
    /// Link strength, 0–100 (the pairwise similarity score).
    pub strength: f32,
    /// What kind of relation this is.
    pub kind: AssociationKind,
}

/// A significant emotional transition, durably remembered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalMemory {
    /// Unique identifier.
    pub id: MemoryId,
    /// Whose memory this is.
    pub character: CharacterId,
    /// Snapshot of the state that was worth remembering.
    pub state: EmotionalState,
    /// What caused it, in free text.
    pub trigger: String,
    /// Situation snapshot at creation time.
    pub context: EmotionalContext,
    /// When the memory formed.
    pub timestamp: DateTime<Utc>,
    /// How significant the transition scored, 0–100.
    pub significance: f32,
    /// How vivid the recollection is, 0–100.
    pub vividness: f32,
    /// How readily the memory surfaces, 0–100.
    pub accessibility: f32,
    /// Memory decay, 0–1. Static at 0.0 — memories do not currently fade.
    pub decay: f32,
    /// Typed links to related memories. The only field that grows.
    pub associations: Vec<MemoryAssociation>,
    /// Searchable tags derived from the state, context, and trigger text.
    pub tags: Vec<String>,
}

impl EmotionalMemory {
    /// Create a memory from a significant transition.
    ///
    /// Vividness and accessibility are derived here and never recomputed:
    ///
    /// - `vividness  = min(100, (intensity·5 + significance) / 2)`
    /// - `accessibility = clamp(70 + intensity·2 + 10·[setting ≠ private]
    ///   + relationship·0.2, 10, 100)`
    #[must_use]
    pub fn new(
        character: CharacterId,
        state: EmotionalState,
        trigger: impl Into<String>,
        context: EmotionalContext,
        significance: f32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let trigger = trigger.into();
        let significance = significance.clamp(0.0, 100.0);
        let intensity = f32::from(state.intensity);

        let vividness = ((intensity * 5.0 + significance) / 2.0).min(100.0);

        let setting_bonus = if context.social_setting == SocialSetting::Private {
            0.0
        } else {
            10.0
        };
        let accessibility = (70.0
            + intensity * 2.0
            + setting_bonus
            + f32::from(context.relationship_level) * 0.2)
            .clamp(10.0, 100.0);

        let tags = derive_tags(&state, &context, &trigger);

        Self {
            id: MemoryId::new(),
            character,
            state,
            trigger,
            context,
            timestamp,
            significance,
            vividness,
            accessibility,
            decay: 0.0,
            associations: Vec::new(),
            tags,
        }
    }

    /// Ranking weight for retrieval: `significance · accessibility · (1 − decay)`.
    #[must_use]
    pub fn recall_weight(&self) -> f32 {
        self.significance * self.accessibility * (1.0 - self.decay)
    }
}

/// Derive searchable tags for a memory.
///
/// Emotion labels, the intensity band, the setting and time-of-day labels,
/// plus every trigger word longer than 3 characters.
fn derive_tags(state: &EmotionalState, context: &EmotionalContext, trigger: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    push(state.primary.label().to_string());
    if let Some(secondary) = state.secondary {
        push(secondary.label().to_string());
    }
    push(intensity_band(f32::from(state.intensity) * 10.0).to_string());
    push(context.social_setting.label().to_string());
    push(context.time_of_day.label().to_string());

    for word in trigger.split_whitespace() {
        let word: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if word.len() > 3 {
            push(word);
        }
    }

    tags
}

// ---------------------------------------------------------------------------
// Association Builder
// ---------------------------------------------------------------------------

/// Pairwise similarity between two memories, 0–100.
///
/// `40·[primary] + 20·[secondary] + 15·[setting] + 10·[time-of-day]
/// + 5·|common tags|`, capped at 100. Secondary counts as matching when both
/// memories agree — including both having none.
#[must_use]
pub fn similarity(a: &EmotionalMemory, b: &EmotionalMemory) -> f32 {
    let mut score = 0.0;
    if a.state.primary == b.state.primary {
        score += 40.0;
    }
    if a.state.secondary == b.state.secondary {
        score += 20.0;
    }
    if a.context.social_setting == b.context.social_setting {
        score += 15.0;
    }
    if a.context.time_of_day == b.context.time_of_day {
        score += 10.0;
    }
    let common = a.tags.iter().filter(|tag| b.tags.contains(tag)).count();
    score += 5.0 * common as f32;
    score.min(100.0)
}

/// Classify the relation between two memories.
///
/// Checked in priority order: sequence (close in time), contrast (opposite
/// primaries), contextual (same setting), similarity (default).
#[must_use]
pub fn classify(
    a: &EmotionalMemory,
    b: &EmotionalMemory,
    config: &AssociationConfig,
) -> AssociationKind {
    let gap = (a.timestamp - b.timestamp).num_minutes().abs();
    if gap <= config.sequence_window_minutes {
        AssociationKind::Sequence
    } else if a.state.primary.is_opposite_of(b.state.primary) {
        AssociationKind::Contrast
    } else if a.context.social_setting == b.context.social_setting {
        AssociationKind::Contextual
    } else {
        AssociationKind::Similarity
    }
}

/// Insert a memory into a character's store, linking it against every
/// existing memory whose similarity clears the configured threshold.
///
/// Edges are added in both directions so either endpoint can walk the graph.
/// Returns the number of associations created.
pub fn insert_linked(
    memories: &mut Vec<EmotionalMemory>,
    mut memory: EmotionalMemory,
    config: &AssociationConfig,
) -> usize {
    let mut linked = 0;
    for existing in memories.iter_mut() {
        let score = similarity(&memory, existing);
        if score > config.link_threshold {
            let kind = classify(&memory, existing, config);
            memory.associations.push(MemoryAssociation {
                target: existing.id,
                strength: score,
                kind,
            });
            existing.associations.push(MemoryAssociation {
                target: memory.id,
                strength: score,
                kind,
            });
            linked += 1;
        }
    }
    memories.push(memory);
    linked
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// Filters for memory retrieval. All fields are optional and conjunctive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryQuery {
    /// Keep memories whose primary emotion is one of these.
    pub emotions: Option<Vec<Emotion>>,
    /// Keep memories at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Keep memories at or before this time.
    pub until: Option<DateTime<Utc>>,
    /// Keep memories with at least this significance.
    pub min_significance: Option<f32>,
    /// Keep memories with at most this significance.
    pub max_significance: Option<f32>,
    /// Keep memories carrying at least one of these tags.
    pub tags: Option<Vec<String>>,
}

impl MemoryQuery {
    /// Whether a memory passes every set filter.
    #[must_use]
    pub fn matches(&self, memory: &EmotionalMemory) -> bool {
        if let Some(emotions) = &self.emotions {
            if !emotions.contains(&memory.state.primary) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if memory.timestamp < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if memory.timestamp > until {
                return false;
            }
        }
        if let Some(min) = self.min_significance {
            if memory.significance < min {
                return false;
            }
        }
        if let Some(max) = self.max_significance {
            if memory.significance > max {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.iter().any(|tag| memory.tags.contains(tag)) {
                return false;
            }
        }
        true
    }
}

/// Retrieve the top-`limit` matching memories, ranked by
/// [`EmotionalMemory::recall_weight`] descending.
#[must_use]
pub fn recall(
    memories: &[EmotionalMemory],
    query: &MemoryQuery,
    limit: usize,
) -> Vec<EmotionalMemory> {
    let mut results: Vec<EmotionalMemory> = memories
        .iter()
        .filter(|memory| query.matches(memory))
        .cloned()
        .collect();
    results.sort_by_key(|memory| std::cmp::Reverse(OrderedFloat(memory.recall_weight())));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SocialSetting, TimeOfDay};
    use chrono::Duration;

    fn context(setting: SocialSetting, time_of_day: TimeOfDay) -> EmotionalContext {
        EmotionalContext::new(setting, 50, time_of_day, "test")
    }

    fn memory(
        primary: Emotion,
        intensity: u8,
        setting: SocialSetting,
        time_of_day: TimeOfDay,
        trigger: &str,
        significance: f32,
        timestamp: DateTime<Utc>,
    ) -> EmotionalMemory {
        EmotionalMemory::new(
            CharacterId::new(),
            EmotionalState::new(primary, None, intensity, "test state"),
            trigger,
            context(setting, time_of_day),
            significance,
            timestamp,
        )
    }

    #[test]
    fn vividness_and_accessibility_formulas() {
        let mem = memory(
            Emotion::Joy,
            8,
            SocialSetting::Public,
            TimeOfDay::Evening,
            "won the contest",
            60.0,
            Utc::now(),
        );
        // (8·5 + 60) / 2 = 50
        assert!((mem.vividness - 50.0).abs() < 1e-4);
        // 70 + 16 + 10 + 50·0.2 = 106 → clamped to 100
        assert!((mem.accessibility - 100.0).abs() < 1e-4);
    }

    #[test]
    fn private_setting_skips_accessibility_bonus() {
        let mem = memory(
            Emotion::Sadness,
            2,
            SocialSetting::Private,
            TimeOfDay::Night,
            "",
            40.0,
            Utc::now(),
        );
        // 70 + 4 + 0 + 10 = 84
        assert!((mem.accessibility - 84.0).abs() < 1e-4);
    }

    #[test]
    fn tags_include_labels_band_and_long_trigger_words() {
        let mem = memory(
            Emotion::Fear,
            7,
            SocialSetting::Group,
            TimeOfDay::Night,
            "the dog barked loudly at us",
            50.0,
            Utc::now(),
        );
        assert!(mem.tags.contains(&"fear".to_string()));
        assert!(mem.tags.contains(&"strong".to_string()));
        assert!(mem.tags.contains(&"group".to_string()));
        assert!(mem.tags.contains(&"night".to_string()));
        assert!(mem.tags.contains(&"barked".to_string()));
        assert!(mem.tags.contains(&"loudly".to_string()));
        // "the", "dog", "at", "us" are all ≤ 3 chars.
        assert!(!mem.tags.contains(&"dog".to_string()));
    }

    #[test]
    fn identical_shape_memories_score_at_least_85_and_link() {
        let now = Utc::now();
        let a = memory(
            Emotion::Joy,
            6,
            SocialSetting::Public,
            TimeOfDay::Morning,
            "parade",
            50.0,
            now,
        );
        let b = memory(
            Emotion::Joy,
            6,
            SocialSetting::Public,
            TimeOfDay::Morning,
            "festival",
            50.0,
            now - Duration::days(2),
        );
        let score = similarity(&a, &b);
        assert!(score >= 85.0, "got {score}");

        let config = AssociationConfig::default();
        let mut store = vec![b];
        let linked = insert_linked(&mut store, a, &config);
        assert_eq!(linked, 1);
        assert_eq!(store[0].associations.len(), 1);
        assert_eq!(store[1].associations.len(), 1);
        assert_eq!(store[0].associations[0].target, store[1].id);
    }

    #[test]
    fn dissimilar_memories_do_not_link() {
        let now = Utc::now();
        let a = memory(
            Emotion::Joy,
            6,
            SocialSetting::Public,
            TimeOfDay::Morning,
            "parade",
            50.0,
            now,
        );
        let mut b = memory(
            Emotion::Loneliness,
            2,
            SocialSetting::Private,
            TimeOfDay::Night,
            "empty house",
            40.0,
            now - Duration::days(30),
        );
        // Remove the incidental secondary-None agreement from the score by
        // giving b a secondary emotion.
        b.state.secondary = Some(Emotion::Sadness);
        let score = similarity(&a, &b);
        assert!(score <= 30.0, "got {score}");

        let config = AssociationConfig::default();
        let mut store = vec![b];
        let linked = insert_linked(&mut store, a, &config);
        assert_eq!(linked, 0);
        assert!(store[0].associations.is_empty());
        assert!(store[1].associations.is_empty());
    }

    #[test]
    fn close_in_time_classifies_as_sequence() {
        let now = Utc::now();
        let a = memory(
            Emotion::Joy,
            5,
            SocialSetting::Private,
            TimeOfDay::Morning,
            "",
            50.0,
            now,
        );
        let b = memory(
            Emotion::Joy,
            5,
            SocialSetting::Private,
            TimeOfDay::Morning,
            "",
            50.0,
            now - Duration::minutes(5),
        );
        assert_eq!(
            classify(&a, &b, &AssociationConfig::default()),
            AssociationKind::Sequence
        );
    }

    #[test]
    fn opposite_primaries_classify_as_contrast_outside_the_window() {
        let now = Utc::now();
        let a = memory(
            Emotion::Joy,
            5,
            SocialSetting::Private,
            TimeOfDay::Morning,
            "",
            50.0,
            now,
        );
        let b = memory(
            Emotion::Sadness,
            5,
            SocialSetting::Public,
            TimeOfDay::Morning,
            "",
            50.0,
            now - Duration::hours(3),
        );
        assert_eq!(
            classify(&a, &b, &AssociationConfig::default()),
            AssociationKind::Contrast
        );
    }

    #[test]
    fn same_setting_classifies_as_contextual() {
        let now = Utc::now();
        let a = memory(
            Emotion::Joy,
            5,
            SocialSetting::Group,
            TimeOfDay::Morning,
            "",
            50.0,
            now,
        );
        let b = memory(
            Emotion::Curiosity,
            5,
            SocialSetting::Group,
            TimeOfDay::Night,
            "",
            50.0,
            now - Duration::hours(3),
        );
        assert_eq!(
            classify(&a, &b, &AssociationConfig::default()),
            AssociationKind::Contextual
        );
    }

    #[test]
    fn recall_ranks_by_weight_and_respects_filters() {
        let now = Utc::now();
        let strong = memory(
            Emotion::Fear,
            9,
            SocialSetting::Public,
            TimeOfDay::Night,
            "ambush",
            90.0,
            now,
        );
        let weak = memory(
            Emotion::Fear,
            3,
            SocialSetting::Private,
            TimeOfDay::Night,
            "noise",
            35.0,
            now,
        );
        let other = memory(
            Emotion::Joy,
            8,
            SocialSetting::Public,
            TimeOfDay::Morning,
            "feast",
            80.0,
            now,
        );
        let store = vec![weak.clone(), other, strong.clone()];

        let query = MemoryQuery {
            emotions: Some(vec![Emotion::Fear]),
            ..MemoryQuery::default()
        };
        let results = recall(&store, &query, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, strong.id);
        assert_eq!(results[1].id, weak.id);

        let results = recall(&store, &query, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, strong.id);
    }

    #[test]
    fn significance_range_filter() {
        let now = Utc::now();
        let store = vec![
            memory(Emotion::Joy, 5, SocialSetting::Private, TimeOfDay::Morning, "", 35.0, now),
            memory(Emotion::Joy, 5, SocialSetting::Private, TimeOfDay::Morning, "", 75.0, now),
        ];
        let query = MemoryQuery {
            min_significance: Some(50.0),
            ..MemoryQuery::default()
        };
        let results = recall(&store, &query, 10);
        assert_eq!(results.len(), 1);
        assert!((results[0].significance - 75.0).abs() < f32::EPSILON);
    }
}
