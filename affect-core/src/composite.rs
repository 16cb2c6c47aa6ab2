//! Composite state calculation — folding the impact ledger into one state.
//!
//! The fold is a pure function over a ledger snapshot: callers take the
//! snapshot under the character lock and write the returned state back whole,
//! which is what makes concurrent decay ticks and update pathways safe.

use ordered_float::OrderedFloat;

use crate::impact::EmotionalImpact;
use crate::types::{intensity_band, Emotion, EmotionalState};

/// Fold the active ledger into a composite state.
///
/// Dominant impact wins `primary`; the strongest impact of a *different*
/// emotion supplies `secondary`. The composite intensity is the capped sum of
/// all impact intensities mapped onto the 1–10 scale.
///
/// Returns `None` for an empty ledger — the caller decides what baseline to
/// fall back to.
#[must_use]
pub fn fold(impacts: &[EmotionalImpact]) -> Option<EmotionalState> {
    let dominant = impacts
        .iter()
        .max_by_key(|impact| OrderedFloat(impact.intensity))?;

    let total: f32 = impacts.iter().map(|impact| impact.intensity).sum();
    let total = total.min(100.0);

    // All distinct non-dominant emotions, strongest first, for the
    // description; the strongest of them becomes `secondary`.
    let mut others: Vec<&EmotionalImpact> = impacts
        .iter()
        .filter(|impact| impact.emotion != dominant.emotion)
        .collect();
    others.sort_by_key(|impact| std::cmp::Reverse(OrderedFloat(impact.intensity)));

    let mut secondary_labels: Vec<&'static str> = Vec::new();
    for impact in &others {
        let label = impact.emotion.label();
        if !secondary_labels.contains(&label) {
            secondary_labels.push(label);
        }
    }

    let secondary = others.first().map(|impact| impact.emotion);
    let intensity = scale_to_composite(total);

    Some(EmotionalState::new(
        dominant.emotion,
        secondary,
        intensity,
        describe(dominant.emotion, &secondary_labels, total),
    ))
}

/// Map a 0–100 intensity total onto the composite 1–10 scale.
#[must_use]
pub fn scale_to_composite(total: f32) -> u8 {
    let rounded = (total / 10.0).round();
    (rounded as u8).clamp(1, 10)
}

/// Build the derived description for a state.
///
/// `total` is on the 0–100 scale; pathway updates that only know the 1–10
/// composite intensity pass `intensity * 10`.
#[must_use]
pub fn describe(primary: Emotion, secondary_labels: &[&str], total: f32) -> String {
    let base = format!("{} {}", intensity_band(total), primary.label());
    if secondary_labels.is_empty() {
        base
    } else {
        format!("{base}, tinged with {}", secondary_labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmotionalContext;
    use std::time::Duration;

    fn impact(emotion: Emotion, intensity: f32) -> EmotionalImpact {
        EmotionalImpact::new(
            emotion,
            intensity,
            Duration::from_secs(600),
            60.0,
            &EmotionalContext::default(),
        )
    }

    #[test]
    fn empty_ledger_folds_to_none() {
        assert!(fold(&[]).is_none());
    }

    #[test]
    fn single_joy_impact_scenario() {
        let state = fold(&[impact(Emotion::Joy, 80.0)]).expect("non-empty");
        assert_eq!(state.primary, Emotion::Joy);
        assert_eq!(state.secondary, None);
        assert_eq!(state.intensity, 8);
        assert_eq!(state.description, "strong joy");
    }

    #[test]
    fn dominant_wins_and_second_ranked_becomes_secondary() {
        let state = fold(&[
            impact(Emotion::Sadness, 30.0),
            impact(Emotion::Anger, 55.0),
            impact(Emotion::Fear, 10.0),
        ])
        .expect("non-empty");
        assert_eq!(state.primary, Emotion::Anger);
        assert_eq!(state.secondary, Some(Emotion::Sadness));
        // 95 total → 10 composite, very strong band.
        assert_eq!(state.intensity, 10);
        assert!(state.description.starts_with("very strong anger"));
        assert!(state.description.contains("sadness"));
        assert!(state.description.contains("fear"));
    }

    #[test]
    fn total_is_capped_at_one_hundred() {
        let state = fold(&[
            impact(Emotion::Joy, 90.0),
            impact(Emotion::Excitement, 90.0),
        ])
        .expect("non-empty");
        assert_eq!(state.intensity, 10);
    }

    #[test]
    fn same_emotion_impacts_produce_no_secondary() {
        let state = fold(&[impact(Emotion::Joy, 40.0), impact(Emotion::Joy, 20.0)])
            .expect("non-empty");
        assert_eq!(state.primary, Emotion::Joy);
        assert_eq!(state.secondary, None);
        assert_eq!(state.intensity, 6);
    }

    #[test]
    fn composite_intensity_never_leaves_scale() {
        let state = fold(&[impact(Emotion::Boredom, 1.0)]).expect("non-empty");
        assert_eq!(state.intensity, 1);
    }
}
