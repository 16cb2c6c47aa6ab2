//! Emotional impacts — time-bounded stimuli with their own decay rates.
//!
//! An impact is distinct from the composite state it contributes to: many
//! impacts can be active at once, each fading independently, and the
//! composite is re-derived from whatever remains in the ledger.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{EmotionFamily, Emotion, EmotionalContext, ImpactId, SocialSetting};

/// A single active emotional stimulus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalImpact {
    /// Unique identifier, used to address the impact's decay timer.
    pub id: ImpactId,
    /// Which emotion this stimulus pushes toward.
    pub emotion: Emotion,
    /// Current strength on the 0–100 scale. Reduced by decay ticks.
    pub intensity: f32,
    /// Nominal lifetime supplied by the caller. Kept as metadata; actual
    /// removal is driven by intensity reaching zero.
    pub duration: Duration,
    /// Percent-per-minute fade rate. Higher rates fade faster, so different
    /// emotions can persist for different lengths of time.
    pub fade_rate: f32,
    /// Derived behavioral effects. Read-only after creation.
    pub manifestations: Manifestations,
}

impl EmotionalImpact {
    /// Create an impact, clamping intensity to [0, 100] and deriving the
    /// manifestation bundle from the emotion family and context.
    #[must_use]
    pub fn new(
        emotion: Emotion,
        intensity: f32,
        duration: Duration,
        fade_rate: f32,
        context: &EmotionalContext,
    ) -> Self {
        Self {
            id: ImpactId::new(),
            emotion,
            intensity: if intensity.is_finite() {
                intensity.clamp(0.0, 100.0)
            } else {
                0.0
            },
            duration,
            fade_rate: if fade_rate.is_finite() {
                fade_rate.max(0.0)
            } else {
                0.0
            },
            manifestations: Manifestations::derive(emotion, context),
        }
    }
}

// ---------------------------------------------------------------------------
// Manifestations
// ---------------------------------------------------------------------------

/// How an active emotion shows up in a character's behavior.
///
/// Derived deterministically from `(emotion family, context)` — the same
/// inputs always produce the same bundle, so the dialogue layer can cache
/// against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifestations {
    /// Observable actions.
    pub behavioral: Vec<String>,
    /// Bodily signs.
    pub physical: Vec<String>,
    /// Thinking-pattern shifts.
    pub cognitive: Vec<String>,
    /// Interaction-style shifts. Modulated by the social setting.
    pub social: Vec<String>,
    /// Drive and goal shifts.
    pub motivational: Vec<String>,
}

impl Manifestations {
    /// Derive the manifestation bundle for an emotion in a given context.
    ///
    /// The lookup is keyed by [`EmotionFamily`], so every emotion — including
    /// anything that parsed to `Neutral` — resolves to exactly one bundle.
    #[must_use]
    pub fn derive(emotion: Emotion, context: &EmotionalContext) -> Self {
        let in_private = matches!(
            context.social_setting,
            SocialSetting::Private | SocialSetting::Intimate
        );

        match emotion.family() {
            EmotionFamily::Joy => Self {
                behavioral: strings(&["seeks out company", "more talkative than usual"]),
                physical: strings(&["relaxed posture", "easy smiles"]),
                cognitive: strings(&["optimistic framing", "broadened attention"]),
                social: if in_private {
                    strings(&["openly warm and affectionate"])
                } else {
                    strings(&["animated in conversation", "quick to include others"])
                },
                motivational: strings(&["initiates plans", "volunteers readily"]),
            },
            EmotionFamily::Sadness => Self {
                behavioral: strings(&["withdraws from activity", "slower to respond"]),
                physical: strings(&["low energy", "heavy posture"]),
                cognitive: strings(&["dwells on losses", "narrowed focus"]),
                social: if in_private {
                    strings(&["seeks quiet reassurance"])
                } else {
                    strings(&["avoids attention", "gives short answers"])
                },
                motivational: strings(&["puts off decisions", "loses interest in goals"]),
            },
            EmotionFamily::Anger => Self {
                behavioral: strings(&["clipped replies", "restless movement"]),
                physical: strings(&["tense jaw", "raised voice"]),
                cognitive: strings(&["fixates on the offense", "assumes hostile intent"]),
                social: if in_private {
                    strings(&["vents freely"])
                } else {
                    strings(&["barely-held composure", "pointed remarks"])
                },
                motivational: strings(&["driven to confront", "dismisses compromise"]),
            },
            EmotionFamily::Fear => Self {
                behavioral: strings(&["scans surroundings", "startles easily"]),
                physical: strings(&["shallow breathing", "tight shoulders"]),
                cognitive: strings(&["catastrophizes", "tunnel vision on the threat"]),
                social: if in_private {
                    strings(&["voices worries openly"])
                } else {
                    strings(&["masks unease", "stays near familiar people"])
                },
                motivational: strings(&["avoids risk", "seeks reassurance"]),
            },
            EmotionFamily::Neutral => Self {
                behavioral: strings(&["keeps to routine"]),
                physical: strings(&["steady, unremarkable bearing"]),
                cognitive: strings(&["even-handed appraisal"]),
                social: strings(&["ordinary courtesy"]),
                motivational: strings(&["follows existing habits"]),
            },
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
