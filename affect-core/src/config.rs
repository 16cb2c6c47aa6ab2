//! Configuration for the affect engine.
//!
//! Maps directly to `affect.toml`. Every field has a serde default so a
//! partial file (or none at all) yields a working configuration.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Composite-state behavior.
    #[serde(default)]
    pub state: StateConfig,
    /// Decay scheduler settings.
    #[serde(default)]
    pub decay: DecayConfig,
    /// Significance scoring weights and the memory gate.
    #[serde(default)]
    pub significance: SignificanceConfig,
    /// Association graph settings.
    #[serde(default)]
    pub association: AssociationConfig,
    /// Memory retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `AffectError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::AffectError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Composite-state and per-character bookkeeping limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Intensity of the neutral baseline state (1–10).
    #[serde(default = "default_3")]
    pub baseline_intensity: u8,
    /// Max simultaneous impacts per character; the weakest is evicted first.
    #[serde(default = "default_12")]
    pub max_active_impacts: usize,
    /// Max transition records kept per character (oldest dropped first).
    #[serde(default = "default_200")]
    pub max_transitions: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            baseline_intensity: 3,
            max_active_impacts: 12,
            max_transitions: 200,
        }
    }
}

/// Decay scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Seconds between decay ticks for each active impact.
    #[serde(default = "default_60")]
    pub tick_interval_secs: u64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
        }
    }
}

/// Significance scoring weights.
///
/// Exposed so a host game can tune how readily characters form memories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignificanceConfig {
    /// A memory is created iff the score strictly exceeds this.
    #[serde(default = "default_30_f32")]
    pub memory_threshold: f32,
    /// Weight on the absolute composite-intensity delta.
    #[serde(default = "default_10_f32")]
    pub delta_weight: f32,
    /// Flat bonus when the primary emotion changed.
    #[serde(default = "default_30_f32")]
    pub primary_change_bonus: f32,
    /// Weight on upstream urgency (0–1 input scale).
    #[serde(default = "default_20_f32")]
    pub urgency_weight: f32,
    /// Weight on upstream emotional intensity (0–1 input scale).
    #[serde(default = "default_25_f32")]
    pub intensity_weight: f32,
    /// Flat bonus when a direct update carries a trigger description.
    #[serde(default = "default_15_f32")]
    pub description_bonus: f32,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            memory_threshold: 30.0,
            delta_weight: 10.0,
            primary_change_bonus: 30.0,
            urgency_weight: 20.0,
            intensity_weight: 25.0,
            description_bonus: 15.0,
        }
    }
}

/// Association graph settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationConfig {
    /// An edge is created iff pairwise similarity strictly exceeds this.
    #[serde(default = "default_30_f32")]
    pub link_threshold: f32,
    /// Two memories closer in time than this are linked as a sequence.
    #[serde(default = "default_60_i64")]
    pub sequence_window_minutes: i64,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            link_threshold: 30.0,
            sequence_window_minutes: 60,
        }
    }
}

/// Memory retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Result cap when the caller does not supply a limit.
    #[serde(default = "default_10_usize")]
    pub default_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_3() -> u8 { 3 }
fn default_12() -> usize { 12 }
fn default_200() -> usize { 200 }
fn default_60() -> u64 { 60 }
fn default_10_f32() -> f32 { 10.0 }
fn default_15_f32() -> f32 { 15.0 }
fn default_20_f32() -> f32 { 20.0 }
fn default_25_f32() -> f32 { 25.0 }
fn default_30_f32() -> f32 { 30.0 }
fn default_60_i64() -> i64 { 60 }
fn default_10_usize() -> usize { 10 }
