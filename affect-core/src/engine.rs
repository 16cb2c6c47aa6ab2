//! The engine registry — per-character state, ledgers, and decay scheduling.
//!
//! One [`AffectEngine`] serves every character. Each character gets a single
//! registry record holding its state, impact ledger, memories, transitions,
//! and profile; the record also owns the decay timers for its impacts, so
//! removing a record (or clearing its ledger) cancels every timer with it —
//! timers cannot outlive the impacts they decay.
//!
//! Locking discipline: all in-memory work happens under the record's mutex
//! within one scheduling tick, and no lock is ever held across an `.await`.
//! State recomputation is a pure fold over a ledger snapshot, written back
//! whole.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::composite;
use crate::config::EngineConfig;
use crate::decay;
use crate::error::{AffectError, Result};
use crate::hooks::{CharacterDirectory, EventSink, NeedsSource, StateChanged, UpdateSource, STATE_TOPIC};
use crate::impact::EmotionalImpact;
use crate::memory::{self, EmotionalMemory, MemoryQuery};
use crate::profile::{EmotionalProfile, ProfileUpdate};
use crate::significance;
use crate::transition::EmotionalTransition;
use crate::types::{CharacterId, CharacterStats, Emotion, EmotionalContext, EmotionalState};
use crate::update::{
    self, DirectUpdate, MessageAnalysis, NeedSnapshot,
};

// ---------------------------------------------------------------------------
// Impact requests
// ---------------------------------------------------------------------------

/// Caller-facing description of an impact to apply.
///
/// The engine derives the manifestation bundle itself so it always matches
/// the context the impact is filed under.
#[derive(Debug, Clone)]
pub struct ImpactRequest {
    /// Which emotion the stimulus pushes toward.
    pub emotion: Emotion,
    /// Starting strength, 0–100.
    pub intensity: f32,
    /// Nominal lifetime.
    pub duration: std::time::Duration,
    /// Percent-per-minute fade rate.
    pub fade_rate: f32,
}

// ---------------------------------------------------------------------------
// Registry internals
// ---------------------------------------------------------------------------

/// Aborts the wrapped timer task when dropped.
struct TimerGuard(JoinHandle<()>);

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A ledger entry: the impact plus the timer that decays it.
struct ActiveImpact {
    impact: EmotionalImpact,
    _timer: TimerGuard,
}

/// Everything the engine tracks for one character.
struct CharacterRecord {
    state: EmotionalState,
    context: EmotionalContext,
    impacts: Vec<ActiveImpact>,
    memories: Vec<EmotionalMemory>,
    transitions: Vec<EmotionalTransition>,
    profile: Option<EmotionalProfile>,
}

impl CharacterRecord {
    fn new(baseline_intensity: u8) -> Self {
        Self {
            state: EmotionalState::neutral(baseline_intensity),
            context: EmotionalContext::default(),
            impacts: Vec::new(),
            memories: Vec::new(),
            transitions: Vec::new(),
            profile: None,
        }
    }

    /// Re-derive the composite state from the current ledger and write it
    /// back whole. An empty ledger folds to the neutral baseline.
    fn recompute_state(&mut self, baseline_intensity: u8) {
        let snapshot: Vec<EmotionalImpact> =
            self.impacts.iter().map(|entry| entry.impact.clone()).collect();
        self.state = composite::fold(&snapshot)
            .unwrap_or_else(|| EmotionalState::neutral(baseline_intensity));
    }
}

type RecordHandle = Arc<Mutex<CharacterRecord>>;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The emotional state simulation engine.
///
/// Cheap to clone conceptually via `Arc`-wrapping by the host; internally all
/// per-character data lives behind a concurrent registry.
pub struct AffectEngine {
    config: EngineConfig,
    directory: Arc<dyn CharacterDirectory>,
    sink: Arc<dyn EventSink>,
    characters: DashMap<CharacterId, RecordHandle>,
}

impl AffectEngine {
    /// Create an engine with its injected collaborators.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        directory: Arc<dyn CharacterDirectory>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            directory,
            sink,
            characters: DashMap::new(),
        }
    }

    /// Fetch the record for a character, creating the neutral default on
    /// first access after confirming the character exists in the directory.
    ///
    /// The directory is only consulted when no record exists yet; every later
    /// call is answered from the registry.
    async fn record(&self, character: CharacterId) -> Result<RecordHandle> {
        if let Some(existing) = self.characters.get(&character) {
            return Ok(Arc::clone(existing.value()));
        }

        if self.directory.lookup(character).await.is_none() {
            return Err(AffectError::CharacterNotFound(character));
        }

        let baseline = self.config.state.baseline_intensity;
        let handle = self
            .characters
            .entry(character)
            .or_insert_with(|| Arc::new(Mutex::new(CharacterRecord::new(baseline))));
        Ok(Arc::clone(handle.value()))
    }

    // -- Exposed operations -------------------------------------------------

    /// Current composite state, creating the neutral default on first access.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn get_state(&self, character: CharacterId) -> Result<EmotionalState> {
        let record = self.record(character).await?;
        let state = record.lock().state.clone();
        Ok(state)
    }

    /// Apply a gradual emotional impact.
    ///
    /// Appends the impact to the ledger, derives its manifestations from the
    /// supplied context, starts its decay timer, and returns the recomputed
    /// composite state. The context also becomes the character's current
    /// context snapshot for subsequent memories.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn apply_impact(
        &self,
        character: CharacterId,
        request: ImpactRequest,
        context: EmotionalContext,
    ) -> Result<EmotionalState> {
        let record = self.record(character).await?;
        let impact = EmotionalImpact::new(
            request.emotion,
            request.intensity,
            request.duration,
            request.fade_rate,
            &context,
        );
        let impact_id = impact.id;
        let timer = self.spawn_decay_timer(Arc::downgrade(&record), impact_id);

        let state = {
            let mut guard = record.lock();
            guard.context = context;

            // Ledger full: the weakest impact makes room, its timer dying
            // with it.
            if guard.impacts.len() >= self.config.state.max_active_impacts {
                if let Some(weakest) = guard
                    .impacts
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, entry)| OrderedFloat(entry.impact.intensity))
                    .map(|(index, _)| index)
                {
                    let evicted = guard.impacts.remove(weakest);
                    debug!(
                        character = %character,
                        emotion = %evicted.impact.emotion,
                        "evicted weakest impact from full ledger"
                    );
                }
            }

            debug!(
                character = %character,
                emotion = %impact.emotion,
                intensity = impact.intensity,
                "impact applied"
            );
            guard.impacts.push(ActiveImpact {
                impact,
                _timer: timer,
            });
            guard.recompute_state(self.config.state.baseline_intensity);
            guard.state.clone()
        };
        Ok(state)
    }

    /// Commit a state change driven by upstream message analysis.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn update_from_analysis(
        &self,
        character: CharacterId,
        analysis: MessageAnalysis,
    ) -> Result<EmotionalState> {
        let record = self.record(character).await?;
        let (state, event) = {
            let mut guard = record.lock();
            let candidate = update::candidate_from_analysis(&guard.state, &analysis);
            let score = significance::analysis_score(
                &self.config.significance,
                guard.state.intensity.abs_diff(candidate.intensity),
                guard.state.primary != candidate.primary,
                analysis.urgency,
                analysis.emotional.emotional_intensity,
            );
            let trigger = if analysis.emotional.user_mood.trim().is_empty() {
                "analyzed message".to_string()
            } else {
                format!("reacting to user mood '{}'", analysis.emotional.user_mood)
            };
            let event = self.commit(
                &mut guard,
                character,
                candidate,
                trigger,
                score,
                UpdateSource::MessageAnalysis,
            );
            (guard.state.clone(), event)
        };
        self.publish(&event);
        Ok(state)
    }

    /// Commit a direct emotion update.
    ///
    /// An update naming no emotions is a no-op and returns the current state
    /// unchanged.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn apply_direct_update(
        &self,
        character: CharacterId,
        direct: DirectUpdate,
    ) -> Result<EmotionalState> {
        let record = self.record(character).await?;
        let Some(candidate) = update::candidate_from_direct(&direct) else {
            return Ok(record.lock().state.clone());
        };

        let (state, event) = {
            let mut guard = record.lock();
            let score = significance::direct_score(
                &self.config.significance,
                guard.state.intensity.abs_diff(candidate.state.intensity),
                guard.state.primary != candidate.state.primary,
                candidate.max_magnitude,
                direct.description.is_some(),
            );
            let trigger = direct
                .description
                .clone()
                .unwrap_or_else(|| "direct emotional update".to_string());
            let event = self.commit(
                &mut guard,
                character,
                candidate.state,
                trigger,
                score,
                UpdateSource::Direct,
            );
            (guard.state.clone(), event)
        };
        self.publish(&event);
        Ok(state)
    }

    /// Commit a state change driven by need frustration.
    ///
    /// Needs below the frustration gate leave the state untouched.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn apply_need_pressure(
        &self,
        character: CharacterId,
        needs: &[NeedSnapshot],
    ) -> Result<EmotionalState> {
        let record = self.record(character).await?;
        let Some(candidate) = update::candidate_from_needs(needs) else {
            return Ok(record.lock().state.clone());
        };

        let (state, event) = {
            let mut guard = record.lock();
            let score = significance::need_score(
                &self.config.significance,
                guard.state.intensity.abs_diff(candidate.state.intensity),
                guard.state.primary != candidate.state.primary,
                candidate.frustration_level,
            );
            let trigger = format!("{} need left unmet", candidate.kind.label());
            let event = self.commit(
                &mut guard,
                character,
                candidate.state,
                trigger,
                score,
                UpdateSource::NeedPressure,
            );
            (guard.state.clone(), event)
        };
        self.publish(&event);
        Ok(state)
    }

    /// Pull need snapshots from the external source and apply them.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn refresh_from_needs(
        &self,
        character: CharacterId,
        source: &dyn NeedsSource,
    ) -> Result<EmotionalState> {
        let needs = source.active_needs(character).await;
        self.apply_need_pressure(character, &needs).await
    }

    /// Reset a character to the neutral baseline.
    ///
    /// The single explicit cancellation point: clears the ledger and
    /// synchronously discards every decay timer for the character before the
    /// lock is released.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn normalize(&self, character: CharacterId) -> Result<EmotionalState> {
        let record = self.record(character).await?;
        let (state, event) = {
            let mut guard = record.lock();
            // Dropping the entries aborts their timers.
            guard.impacts.clear();
            let old = std::mem::replace(
                &mut guard.state,
                EmotionalState::neutral(self.config.state.baseline_intensity),
            );
            let new_state = guard.state.clone();
            push_transition(
                &mut guard.transitions,
                EmotionalTransition::new(old.clone(), new_state.clone(), "normalized", Utc::now()),
                self.config.state.max_transitions,
            );
            debug!(character = %character, "state normalized");
            (
                new_state.clone(),
                StateChanged {
                    character,
                    old_state: old,
                    new_state,
                    trigger: "normalized".to_string(),
                    source: UpdateSource::Normalize,
                },
            )
        };
        self.publish(&event);
        Ok(state)
    }

    /// Retrieve memories matching a query, ranked by recall weight.
    ///
    /// `limit` falls back to the configured default when absent.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn get_recent_memories(
        &self,
        character: CharacterId,
        query: &MemoryQuery,
        limit: Option<usize>,
    ) -> Result<Vec<EmotionalMemory>> {
        let record = self.record(character).await?;
        let limit = limit.unwrap_or(self.config.retrieval.default_limit);
        let memories = {
            let guard = record.lock();
            memory::recall(&guard.memories, query, limit)
        };
        Ok(memories)
    }

    /// Transition history, newest first, optionally bounded by a time range.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn get_transitions(
        &self,
        character: CharacterId,
        from: Option<chrono::DateTime<Utc>>,
        until: Option<chrono::DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<EmotionalTransition>> {
        let record = self.record(character).await?;
        let limit = limit.unwrap_or(self.config.retrieval.default_limit);
        let transitions = {
            let guard = record.lock();
            guard
                .transitions
                .iter()
                .rev()
                .filter(|transition| {
                    from.is_none_or(|from| transition.timestamp >= from)
                        && until.is_none_or(|until| transition.timestamp <= until)
                })
                .take(limit)
                .cloned()
                .collect()
        };
        Ok(transitions)
    }

    /// The character's disposition profile, created on first access.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn get_profile(&self, character: CharacterId) -> Result<EmotionalProfile> {
        let record = self.record(character).await?;
        let profile = record
            .lock()
            .profile
            .get_or_insert_with(EmotionalProfile::default)
            .clone();
        Ok(profile)
    }

    /// Partially update the character's profile, returning the merged result.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn update_profile(
        &self,
        character: CharacterId,
        update: ProfileUpdate,
    ) -> Result<EmotionalProfile> {
        let record = self.record(character).await?;
        let profile = {
            let mut guard = record.lock();
            let profile = guard.profile.get_or_insert_with(EmotionalProfile::default);
            profile.merge(update);
            profile.clone()
        };
        Ok(profile)
    }

    /// Snapshot of the character's currently active impacts.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn active_impacts(&self, character: CharacterId) -> Result<Vec<EmotionalImpact>> {
        let record = self.record(character).await?;
        let impacts = record
            .lock()
            .impacts
            .iter()
            .map(|entry| entry.impact.clone())
            .collect();
        Ok(impacts)
    }

    /// Per-character bookkeeping counters.
    ///
    /// # Errors
    /// `CharacterNotFound` if the directory does not know the character.
    pub async fn stats(&self, character: CharacterId) -> Result<CharacterStats> {
        let record = self.record(character).await?;
        let guard = record.lock();
        Ok(CharacterStats {
            active_impacts: guard.impacts.len(),
            memories: guard.memories.len(),
            transitions: guard.transitions.len(),
        })
    }

    /// Drop a character's record entirely, cancelling its timers.
    ///
    /// Returns whether a record existed. Safe to call for unknown ids.
    pub fn end_session(&self, character: CharacterId) -> bool {
        let removed = self.characters.remove(&character).is_some();
        if removed {
            debug!(character = %character, "session ended, record dropped");
        }
        removed
    }

    // -- Internals ----------------------------------------------------------

    /// Commit a candidate state under the record lock: transition record,
    /// significance-gated memory, state write. Returns the event for the
    /// caller to publish after releasing the lock.
    fn commit(
        &self,
        record: &mut CharacterRecord,
        character: CharacterId,
        new_state: EmotionalState,
        trigger: String,
        score: f32,
        source: UpdateSource,
    ) -> StateChanged {
        let now = Utc::now();
        let old = std::mem::replace(&mut record.state, new_state.clone());

        push_transition(
            &mut record.transitions,
            EmotionalTransition::new(old.clone(), new_state.clone(), trigger.clone(), now),
            self.config.state.max_transitions,
        );

        if significance::is_memorable(&self.config.significance, score) {
            let created = EmotionalMemory::new(
                character,
                new_state.clone(),
                trigger.clone(),
                record.context.clone(),
                score,
                now,
            );
            let linked =
                memory::insert_linked(&mut record.memories, created, &self.config.association);
            debug!(
                character = %character,
                significance = score,
                linked,
                "memory formed"
            );
        }

        StateChanged {
            character,
            old_state: old,
            new_state,
            trigger,
            source,
        }
    }

    /// Fire-and-forget event publication.
    fn publish(&self, event: &StateChanged) {
        if let Err(error) = self.sink.publish(STATE_TOPIC, event) {
            warn!(
                character = %event.character,
                "event publish failed: {error}"
            );
        }
    }

    /// Spawn the decay timer for one impact.
    ///
    /// The task holds only a weak reference to the record: if the record is
    /// dropped the task exits on its next tick, and if the impact is removed
    /// first the task exits when it no longer finds it. Errors in one timer
    /// cannot affect another — each impact has its own task.
    fn spawn_decay_timer(
        &self,
        record: std::sync::Weak<Mutex<CharacterRecord>>,
        impact_id: crate::types::ImpactId,
    ) -> TimerGuard {
        let tick_secs = self.config.decay.tick_interval_secs;
        let baseline = self.config.state.baseline_intensity;

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(tick_secs.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so decay
            // starts one full interval after the impact lands.
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(record) = record.upgrade() else { break };
                let mut guard = record.lock();
                let Some(position) = guard
                    .impacts
                    .iter()
                    .position(|entry| entry.impact.id == impact_id)
                else {
                    break;
                };

                let (current, fade_rate) = {
                    let impact = &guard.impacts[position].impact;
                    (impact.intensity, impact.fade_rate)
                };
                let next = decay::step(current, fade_rate);
                if decay::is_spent(next) {
                    // Removing the entry aborts this task via its guard; we
                    // finish the pass and return before the next await.
                    guard.impacts.remove(position);
                    guard.recompute_state(baseline);
                    debug!(impact = %impact_id, "impact fully decayed");
                    break;
                }
                guard.impacts[position].impact.intensity = next;
                guard.recompute_state(baseline);
            }
        });

        TimerGuard(handle)
    }
}

/// Append a transition, dropping the oldest once the cap is reached.
fn push_transition(
    transitions: &mut Vec<EmotionalTransition>,
    transition: EmotionalTransition,
    max: usize,
) {
    transitions.push(transition);
    if transitions.len() > max {
        let excess = transitions.len() - max;
        transitions.drain(..excess);
    }
}
