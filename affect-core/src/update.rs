//! Update pathway inputs and candidate-state computation.
//!
//! Three independent triggers feed the engine: structured message analysis
//! from the NLU layer, direct emotion updates from the host, and need
//! frustration snapshots. Each produces a *candidate* composite state here as
//! a pure function; the engine is responsible for committing it (transition
//! record, significance gate, memory, event).
//!
//! Malformed upstream data never errors — fields are clamped or defaulted
//! per the engine's invalid-input policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::composite;
use crate::types::{Emotion, EmotionalState};

// ---------------------------------------------------------------------------
// Message-analysis pathway
// ---------------------------------------------------------------------------

/// Structured output of the upstream message-analysis component.
///
/// Passed by value; the engine never calls back into the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAnalysis {
    /// How urgent the analyzed message is, 0–1.
    pub urgency: f32,
    /// Emotion-level analysis of the message.
    pub emotional: EmotionalAnalysis,
}

/// Emotion-level fields of a message analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalAnalysis {
    /// The analyzer's read of the user's mood.
    pub user_mood: String,
    /// Comma-separated emotion labels the character is expected to feel.
    pub expected_emotional_response: String,
    /// Strength of the expected response, 0–1.
    pub emotional_intensity: f32,
    /// Labels the analyzer flagged as triggering.
    pub trigger_emotions: Vec<String>,
}

/// Parse an `expected_emotional_response` string into primary + secondaries.
///
/// Splits on commas; an empty or whitespace-only first token parses to
/// `Neutral`. Secondary labels are deduplicated, and neither the primary nor
/// `Neutral` fallbacks are repeated in them.
#[must_use]
pub fn parse_expected_response(text: &str) -> (Emotion, Vec<Emotion>) {
    let mut parts = text.split(',');
    let primary = Emotion::from_label(parts.next().unwrap_or(""));

    let mut secondaries = Vec::new();
    for part in parts {
        let emotion = Emotion::from_label(part);
        if emotion != primary && emotion != Emotion::Neutral && !secondaries.contains(&emotion) {
            secondaries.push(emotion);
        }
    }
    (primary, secondaries)
}

/// Compute the candidate state for an analysis-driven update.
///
/// New intensity averages the current composite intensity with the urgency
/// mapped onto the 1–10 scale: `round((current + round(urgency·10)) / 2)`.
#[must_use]
pub fn candidate_from_analysis(
    current: &EmotionalState,
    analysis: &MessageAnalysis,
) -> EmotionalState {
    let (primary, secondaries) = parse_expected_response(
        &analysis.emotional.expected_emotional_response,
    );

    let urgency_points = (unit(analysis.urgency) * 10.0).round();
    let intensity = ((f32::from(current.intensity) + urgency_points) / 2.0).round();
    let intensity = (intensity as u8).clamp(1, 10);

    let labels: Vec<&str> = secondaries.iter().map(|e| e.label()).collect();
    EmotionalState::new(
        primary,
        secondaries.first().copied(),
        intensity,
        composite::describe(primary, &labels, f32::from(intensity) * 10.0),
    )
}

// ---------------------------------------------------------------------------
// Direct-update pathway
// ---------------------------------------------------------------------------

/// A direct emotion update from the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectUpdate {
    /// Requested emotions and their magnitudes on the 0–100 scale.
    pub emotions: BTreeMap<Emotion, f32>,
    /// Optional free-text description of what triggered the update.
    pub description: Option<String>,
}

/// Candidate produced by the direct pathway, with the dominant magnitude the
/// significance formula needs.
#[derive(Debug, Clone)]
pub struct DirectCandidate {
    /// The candidate composite state.
    pub state: EmotionalState,
    /// Strongest requested magnitude, 0–100.
    pub max_magnitude: f32,
}

/// Compute the candidate state for a direct update.
///
/// The strongest magnitude picks `primary`; the next-highest *distinct*
/// emotion picks `secondary`. Returns `None` when the update names no
/// emotions (a no-op, not an error).
#[must_use]
pub fn candidate_from_direct(update: &DirectUpdate) -> Option<DirectCandidate> {
    let mut ranked: Vec<(Emotion, f32)> = update
        .emotions
        .iter()
        .map(|(&emotion, &magnitude)| (emotion, unit(magnitude / 100.0) * 100.0))
        .collect();
    // Stable on the BTreeMap's emotion order, so ties resolve
    // deterministically.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (primary, max_magnitude) = *ranked.first()?;
    let secondary = ranked
        .iter()
        .find(|(emotion, _)| *emotion != primary)
        .map(|(emotion, _)| *emotion);

    let intensity = ((max_magnitude / 10.0).round() as u8).clamp(1, 10);
    let labels: Vec<&str> = secondary.iter().map(|e| e.label()).collect();

    Some(DirectCandidate {
        state: EmotionalState::new(
            primary,
            secondary,
            intensity,
            composite::describe(primary, &labels, f32::from(intensity) * 10.0),
        ),
        max_magnitude,
    })
}

// ---------------------------------------------------------------------------
// Need-driven pathway
// ---------------------------------------------------------------------------

/// The needs a character can accumulate frustration against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    /// Closeness and care from others.
    Affection,
    /// Company and belonging.
    Social,
    /// Sleep and downtime.
    Rest,
    /// Novelty and engagement.
    Stimulation,
    /// Physical and emotional security.
    Safety,
    /// Progress toward goals.
    Achievement,
}

impl NeedKind {
    /// Lowercase label for triggers and logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Affection => "affection",
            Self::Social => "social",
            Self::Rest => "rest",
            Self::Stimulation => "stimulation",
            Self::Safety => "safety",
            Self::Achievement => "achievement",
        }
    }

    /// Fixed need → emotion weight table.
    ///
    /// The highest-weighted emotion becomes the candidate primary; the next
    /// entry, if any, becomes the secondary. Entries are listed
    /// strongest-first.
    #[must_use]
    pub fn emotion_weights(self) -> &'static [(Emotion, f32)] {
        match self {
            Self::Affection => &[(Emotion::Sadness, 0.9), (Emotion::Loneliness, 0.7)],
            Self::Social => &[(Emotion::Loneliness, 0.9), (Emotion::Boredom, 0.5)],
            Self::Rest => &[(Emotion::Frustration, 0.8), (Emotion::Anger, 0.5)],
            Self::Stimulation => &[(Emotion::Boredom, 0.9), (Emotion::Frustration, 0.6)],
            Self::Safety => &[(Emotion::Fear, 0.9), (Emotion::Anxiety, 0.8)],
            Self::Achievement => &[(Emotion::Frustration, 0.9), (Emotion::Sadness, 0.6)],
        }
    }
}

/// Read-only snapshot of one need, supplied by the external needs source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedSnapshot {
    /// Which need this is.
    pub kind: NeedKind,
    /// Current satisfaction value, 0–100.
    pub current_value: f32,
    /// Accumulated frustration, 0–100.
    pub frustration_level: f32,
}

/// Frustration level below which need pressure is ignored.
pub const FRUSTRATION_GATE: f32 = 50.0;

/// Candidate produced by the need pathway.
#[derive(Debug, Clone)]
pub struct NeedCandidate {
    /// The candidate composite state.
    pub state: EmotionalState,
    /// Which need drove it.
    pub kind: NeedKind,
    /// The driving need's frustration level, 0–100.
    pub frustration_level: f32,
}

/// Compute the candidate state for need pressure.
///
/// Selects the most frustrated need; anything under [`FRUSTRATION_GATE`] is a
/// no-op. Intensity is `round(frustration/10) + floor(current_value/25)`,
/// clamped to the composite scale.
#[must_use]
pub fn candidate_from_needs(needs: &[NeedSnapshot]) -> Option<NeedCandidate> {
    let worst = needs.iter().max_by(|a, b| {
        sanitize(a.frustration_level).total_cmp(&sanitize(b.frustration_level))
    })?;

    let frustration = sanitize(worst.frustration_level);
    if frustration < FRUSTRATION_GATE {
        return None;
    }

    let weights = worst.kind.emotion_weights();
    let (primary, _) = *weights.first()?;
    let secondary = weights.get(1).map(|(emotion, _)| *emotion);

    let current = sanitize(worst.current_value);
    let raw = (frustration / 10.0).round() + (current / 25.0).floor();
    let intensity = (raw as u8).clamp(1, 10);

    let labels: Vec<&str> = secondary.iter().map(|e| e.label()).collect();
    Some(NeedCandidate {
        state: EmotionalState::new(
            primary,
            secondary,
            intensity,
            composite::describe(primary, &labels, f32::from(intensity) * 10.0),
        ),
        kind: worst.kind,
        frustration_level: frustration,
    })
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_handles_blank_and_lists() {
        assert_eq!(parse_expected_response(""), (Emotion::Neutral, vec![]));
        assert_eq!(parse_expected_response("   "), (Emotion::Neutral, vec![]));
        let (primary, secondaries) = parse_expected_response("joy, excitement, joy, mystery");
        assert_eq!(primary, Emotion::Joy);
        // Duplicate primary and the unknown label's Neutral fallback are
        // both dropped.
        assert_eq!(secondaries, vec![Emotion::Excitement]);
    }

    #[test]
    fn analysis_intensity_averages_current_with_urgency() {
        let current = EmotionalState::neutral(3);
        let analysis = MessageAnalysis {
            urgency: 0.9,
            emotional: EmotionalAnalysis {
                user_mood: "upset".into(),
                expected_emotional_response: "anxiety, fear".into(),
                emotional_intensity: 0.7,
                trigger_emotions: vec!["fear".into()],
            },
        };
        let candidate = candidate_from_analysis(&current, &analysis);
        // round((3 + round(0.9·10)) / 2) = round(6) = 6
        assert_eq!(candidate.intensity, 6);
        assert_eq!(candidate.primary, Emotion::Anxiety);
        assert_eq!(candidate.secondary, Some(Emotion::Fear));
    }

    #[test]
    fn analysis_urgency_out_of_range_is_clamped() {
        let current = EmotionalState::neutral(3);
        let analysis = MessageAnalysis {
            urgency: 42.0,
            emotional: EmotionalAnalysis {
                user_mood: String::new(),
                expected_emotional_response: "joy".into(),
                emotional_intensity: 0.0,
                trigger_emotions: vec![],
            },
        };
        let candidate = candidate_from_analysis(&current, &analysis);
        // urgency clamps to 1.0 → round((3 + 10) / 2) = 7
        assert_eq!(candidate.intensity, 7);
    }

    #[test]
    fn direct_update_picks_max_and_next_distinct() {
        let mut update = DirectUpdate::default();
        update.emotions.insert(Emotion::Joy, 75.0);
        update.emotions.insert(Emotion::Excitement, 60.0);
        update.emotions.insert(Emotion::Contentment, 20.0);

        let candidate = candidate_from_direct(&update).expect("non-empty");
        assert_eq!(candidate.state.primary, Emotion::Joy);
        assert_eq!(candidate.state.secondary, Some(Emotion::Excitement));
        assert_eq!(candidate.state.intensity, 8);
        assert!((candidate.max_magnitude - 75.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_direct_update_is_a_no_op() {
        assert!(candidate_from_direct(&DirectUpdate::default()).is_none());
    }

    #[test]
    fn affection_need_scenario() {
        let needs = vec![NeedSnapshot {
            kind: NeedKind::Affection,
            current_value: 60.0,
            frustration_level: 90.0,
        }];
        let candidate = candidate_from_needs(&needs).expect("gated in");
        // Weight table: sadness 0.9 beats loneliness 0.7.
        assert_eq!(candidate.state.primary, Emotion::Sadness);
        assert_eq!(candidate.state.secondary, Some(Emotion::Loneliness));
        // round(90/10) + floor(60/25) = 9 + 2 = 11 → clamped to 10.
        assert_eq!(candidate.state.intensity, 10);
    }

    #[test]
    fn low_frustration_is_a_no_op() {
        let needs = vec![NeedSnapshot {
            kind: NeedKind::Safety,
            current_value: 80.0,
            frustration_level: 49.9,
        }];
        assert!(candidate_from_needs(&needs).is_none());
    }

    #[test]
    fn most_frustrated_need_wins() {
        let needs = vec![
            NeedSnapshot {
                kind: NeedKind::Social,
                current_value: 10.0,
                frustration_level: 55.0,
            },
            NeedSnapshot {
                kind: NeedKind::Safety,
                current_value: 10.0,
                frustration_level: 85.0,
            },
        ];
        let candidate = candidate_from_needs(&needs).expect("gated in");
        assert_eq!(candidate.kind, NeedKind::Safety);
        assert_eq!(candidate.state.primary, Emotion::Fear);
    }

    #[test]
    fn malformed_need_values_are_defaulted() {
        let needs = vec![NeedSnapshot {
            kind: NeedKind::Rest,
            current_value: f32::NAN,
            frustration_level: 500.0,
        }];
        let candidate = candidate_from_needs(&needs).expect("frustration clamps to 100");
        // round(100/10) + floor(0/25) = 10.
        assert_eq!(candidate.state.intensity, 10);
    }
}
