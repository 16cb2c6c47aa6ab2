//! Per-character emotional disposition profiles.
//!
//! A profile is the slow-moving baseline under the fast-moving composite
//! state: which emotions come easily, how well the character regulates, and
//! what they are vulnerable to. Profiles are created lazily on first access
//! and updated by partial merge — callers send only the fields they want
//! changed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Emotion;

/// How readily a character can reach and express one emotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionRange {
    /// Ceiling on composite intensity this emotion can drive, 1–10.
    pub max_intensity: u8,
    /// How accessible the emotion is, 0–1.
    pub accessibility: f32,
}

impl Default for EmotionRange {
    fn default() -> Self {
        Self {
            max_intensity: 10,
            accessibility: 0.5,
        }
    }
}

/// Emotion-regulation strategies a character may employ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegulationStrategy {
    /// Reframing the situation.
    Reappraisal,
    /// Redirecting attention elsewhere.
    Distraction,
    /// Damping the outward expression.
    Suppression,
    /// Talking it through with someone.
    SocialSharing,
}

/// A known emotional weak point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Emotion the character is vulnerable to.
    pub emotion: Emotion,
    /// What tends to set it off.
    pub trigger: String,
    /// How badly it lands, 0–1.
    pub severity: f32,
}

/// A known emotional strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    /// What the character is good at emotionally.
    pub description: String,
    /// How reliably it helps, 0–1.
    pub effectiveness: f32,
}

/// Baseline emotional disposition for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalProfile {
    /// Resting weight of each emotion, 0–1.
    pub baseline: BTreeMap<Emotion, f32>,
    /// Per-emotion range and accessibility.
    pub range: BTreeMap<Emotion, EmotionRange>,
    /// How effective each regulation strategy is for this character, 0–1.
    pub regulation: BTreeMap<RegulationStrategy, f32>,
    /// Known weak points.
    pub vulnerabilities: Vec<Vulnerability>,
    /// Known strengths.
    pub strengths: Vec<Strength>,
    /// How quickly the character adjusts to change, 0–1.
    pub adaptability: f32,
    /// How quickly the character recovers from setbacks, 0–1.
    pub resilience: f32,
    /// How strongly stimuli register, 0–1.
    pub sensitivity: f32,
    /// How visibly emotions show, 0–1.
    pub expressiveness: f32,
}

impl Default for EmotionalProfile {
    fn default() -> Self {
        let mut baseline = BTreeMap::new();
        baseline.insert(Emotion::Neutral, 0.6);
        baseline.insert(Emotion::Contentment, 0.4);

        let mut regulation = BTreeMap::new();
        regulation.insert(RegulationStrategy::Reappraisal, 0.5);
        regulation.insert(RegulationStrategy::Distraction, 0.5);
        regulation.insert(RegulationStrategy::Suppression, 0.5);
        regulation.insert(RegulationStrategy::SocialSharing, 0.5);

        Self {
            baseline,
            range: BTreeMap::new(),
            regulation,
            vulnerabilities: Vec::new(),
            strengths: Vec::new(),
            adaptability: 0.5,
            resilience: 0.5,
            sensitivity: 0.5,
            expressiveness: 0.5,
        }
    }
}

impl EmotionalProfile {
    /// Apply a partial update, merging maps and replacing set scalars.
    ///
    /// Map entries override per key; list entries append; scalars replace
    /// only when supplied. Scalars are clamped to [0, 1].
    pub fn merge(&mut self, update: ProfileUpdate) {
        if let Some(baseline) = update.baseline {
            self.baseline.extend(baseline);
        }
        if let Some(range) = update.range {
            self.range.extend(range);
        }
        if let Some(regulation) = update.regulation {
            self.regulation.extend(regulation);
        }
        if let Some(vulnerabilities) = update.vulnerabilities {
            self.vulnerabilities.extend(vulnerabilities);
        }
        if let Some(strengths) = update.strengths {
            self.strengths.extend(strengths);
        }
        if let Some(adaptability) = update.adaptability {
            self.adaptability = adaptability.clamp(0.0, 1.0);
        }
        if let Some(resilience) = update.resilience {
            self.resilience = resilience.clamp(0.0, 1.0);
        }
        if let Some(sensitivity) = update.sensitivity {
            self.sensitivity = sensitivity.clamp(0.0, 1.0);
        }
        if let Some(expressiveness) = update.expressiveness {
            self.expressiveness = expressiveness.clamp(0.0, 1.0);
        }
    }
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Baseline weights to set or override, per emotion.
    pub baseline: Option<BTreeMap<Emotion, f32>>,
    /// Range entries to set or override, per emotion.
    pub range: Option<BTreeMap<Emotion, EmotionRange>>,
    /// Regulation effectiveness to set or override, per strategy.
    pub regulation: Option<BTreeMap<RegulationStrategy, f32>>,
    /// Vulnerabilities to append.
    pub vulnerabilities: Option<Vec<Vulnerability>>,
    /// Strengths to append.
    pub strengths: Option<Vec<Strength>>,
    /// New adaptability scalar.
    pub adaptability: Option<f32>,
    /// New resilience scalar.
    pub resilience: Option<f32>,
    /// New sensitivity scalar.
    pub sensitivity: Option<f32>,
    /// New expressiveness scalar.
    pub expressiveness: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_only_supplied_scalars() {
        let mut profile = EmotionalProfile::default();
        profile.merge(ProfileUpdate {
            resilience: Some(0.9),
            ..ProfileUpdate::default()
        });
        assert!((profile.resilience - 0.9).abs() < f32::EPSILON);
        assert!((profile.adaptability - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn merge_clamps_scalars() {
        let mut profile = EmotionalProfile::default();
        profile.merge(ProfileUpdate {
            sensitivity: Some(4.0),
            ..ProfileUpdate::default()
        });
        assert!((profile.sensitivity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn merge_overrides_map_entries_per_key() {
        let mut profile = EmotionalProfile::default();
        let mut baseline = BTreeMap::new();
        baseline.insert(Emotion::Anxiety, 0.7);
        profile.merge(ProfileUpdate {
            baseline: Some(baseline),
            ..ProfileUpdate::default()
        });
        // New key added; untouched keys survive.
        assert!((profile.baseline[&Emotion::Anxiety] - 0.7).abs() < f32::EPSILON);
        assert!(profile.baseline.contains_key(&Emotion::Neutral));
    }

    #[test]
    fn merge_appends_vulnerabilities() {
        let mut profile = EmotionalProfile::default();
        profile.merge(ProfileUpdate {
            vulnerabilities: Some(vec![Vulnerability {
                emotion: Emotion::Fear,
                trigger: "thunder".into(),
                severity: 0.8,
            }]),
            ..ProfileUpdate::default()
        });
        profile.merge(ProfileUpdate {
            vulnerabilities: Some(vec![Vulnerability {
                emotion: Emotion::Anxiety,
                trigger: "crowds".into(),
                severity: 0.6,
            }]),
            ..ProfileUpdate::default()
        });
        assert_eq!(profile.vulnerabilities.len(), 2);
    }
}
