//! Significance scoring — deciding whether a transition is memorable.
//!
//! Each update pathway has its own formula, built from the same pieces: the
//! absolute change in composite intensity, whether the primary emotion
//! flipped, and a pathway-specific strength signal. Scores are clamped to
//! [0, 100]; a memory is created iff the score strictly exceeds the
//! configured threshold.

use crate::config::SignificanceConfig;

/// Score an analysis-driven transition.
///
/// `urgency` and `emotional_intensity` are on the upstream 0–1 scale; out of
/// range or non-finite values are defensively clamped rather than rejected.
#[must_use]
pub fn analysis_score(
    config: &SignificanceConfig,
    intensity_delta: u8,
    primary_changed: bool,
    urgency: f32,
    emotional_intensity: f32,
) -> f32 {
    let base = base_score(config, intensity_delta, primary_changed);
    let score = base
        + unit(urgency) * config.urgency_weight
        + unit(emotional_intensity) * config.intensity_weight;
    score.clamp(0.0, 100.0)
}

/// Score a direct-update transition.
///
/// `max_magnitude` is the strongest requested emotion on the 0–100 scale;
/// `has_description` adds a flat bonus when the caller supplied a free-text
/// trigger description.
#[must_use]
pub fn direct_score(
    config: &SignificanceConfig,
    intensity_delta: u8,
    primary_changed: bool,
    max_magnitude: f32,
    has_description: bool,
) -> f32 {
    let base = base_score(config, intensity_delta, primary_changed);
    let magnitude_term = unit(max_magnitude / 100.0) * config.intensity_weight;
    let description_term = if has_description {
        config.description_bonus
    } else {
        0.0
    };
    (base + magnitude_term + description_term).clamp(0.0, 100.0)
}

/// Score a need-driven transition.
///
/// The frustration level (0–100) stands in for the pathway's strength signal,
/// scaled the same way the direct pathway scales its magnitude.
#[must_use]
pub fn need_score(
    config: &SignificanceConfig,
    intensity_delta: u8,
    primary_changed: bool,
    frustration_level: f32,
) -> f32 {
    let base = base_score(config, intensity_delta, primary_changed);
    (base + unit(frustration_level / 100.0) * config.intensity_weight).clamp(0.0, 100.0)
}

/// Whether a score clears the memory gate.
#[must_use]
pub fn is_memorable(config: &SignificanceConfig, score: f32) -> bool {
    score > config.memory_threshold
}

fn base_score(config: &SignificanceConfig, intensity_delta: u8, primary_changed: bool) -> f32 {
    f32::from(intensity_delta) * config.delta_weight
        + if primary_changed {
            config.primary_change_bonus
        } else {
            0.0
        }
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
