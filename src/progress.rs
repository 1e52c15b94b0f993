//! Stage progression - lock/unlock/complete state machine over the five stages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::EngineConfig;

pub type StageId = u8;

pub const STAGE_IDS: [StageId; 5] = [1, 2, 3, 4, 5];
pub const ALL_IN_ONE_STAGE: StageId = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Locked,
    Unlocked,
    Current,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub id: StageId,
    pub title: String,
    pub status: StageStatus,
    pub reward_points: u32,
}

impl StageDefinition {
    fn locked(id: StageId, title: &str, reward_points: u32) -> Self {
        Self {
            id,
            title: title.to_string(),
            status: StageStatus::Locked,
            reward_points,
        }
    }
}

/// The five stages in their fixed order, all locked.
pub fn default_stage_definitions() -> Vec<StageDefinition> {
    vec![
        StageDefinition::locked(1, "Meanings", 100),
        StageDefinition::locked(2, "Word Family", 150),
        StageDefinition::locked(3, "Synonyms & Antonyms", 200),
        StageDefinition::locked(4, "Sentences", 250),
        StageDefinition::locked(5, "All-in-One", 500),
    ]
}

/// Ways a stage can be practised. Any one completion finishes the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PracticeMode {
    Standard,
    Matching,
    FillInWord,
    FillInMeaning,
}

/// Learner progress. Owned by the caller; changed only through
/// `StageProgressionEngine` transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    stages: Vec<StageDefinition>,
    #[serde(default)]
    completed_modes: BTreeMap<StageId, BTreeSet<PracticeMode>>,
    #[serde(default)]
    completed_at: BTreeMap<StageId, DateTime<Utc>>,
    #[serde(default)]
    active_stage: Option<StageId>,
    #[serde(default)]
    earned_points: u32,
}

impl ProgressState {
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn status(&self, id: StageId) -> Option<StageStatus> {
        self.stages.iter().find(|s| s.id == id).map(|s| s.status)
    }

    pub fn statuses(&self) -> Vec<StageStatus> {
        self.stages.iter().map(|s| s.status).collect()
    }

    pub fn current_stage(&self) -> Option<StageId> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Current)
            .map(|s| s.id)
    }

    /// Stage being played; differs from the current stage while revisiting.
    pub fn active_stage(&self) -> Option<StageId> {
        self.active_stage
    }

    pub fn completed_modes(&self, id: StageId) -> BTreeSet<PracticeMode> {
        self.completed_modes.get(&id).cloned().unwrap_or_default()
    }

    pub fn completed_at(&self, id: StageId) -> Option<DateTime<Utc>> {
        self.completed_at.get(&id).copied()
    }

    pub fn earned_points(&self) -> u32 {
        self.earned_points
    }

    /// Every stage completed.
    pub fn is_victory(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(|s| s.status == StageStatus::Completed)
    }

    fn position(&self, id: StageId) -> Option<usize> {
        self.stages.iter().position(|s| s.id == id)
    }

    fn demote_current_except(&mut self, keep: usize) {
        for (i, stage) in self.stages.iter_mut().enumerate() {
            if i != keep && stage.status == StageStatus::Current {
                stage.status = StageStatus::Unlocked;
            }
        }
    }
}

/// Outcome of a mode completion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransition {
    pub state: ProgressState,
    /// First completion of this stage.
    pub newly_completed: bool,
    /// Stage that became current as a result.
    pub promoted: Option<StageId>,
    pub victory: bool,
}

impl StageTransition {
    fn unchanged(state: ProgressState) -> Self {
        let victory = state.is_victory();
        Self {
            state,
            newly_completed: false,
            promoted: None,
            victory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageProgressionEngine {
    definitions: Vec<StageDefinition>,
    matching_min_words: usize,
}

impl Default for StageProgressionEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl StageProgressionEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            definitions: default_stage_definitions(),
            matching_min_words: config.matching_min_words,
        }
    }

    /// Custom titles/rewards. Definitions are sorted by id; statuses are ignored.
    pub fn with_definitions(
        mut definitions: Vec<StageDefinition>,
        matching_min_words: usize,
    ) -> Self {
        definitions.sort_by_key(|d| d.id);
        definitions.dedup_by_key(|d| d.id);
        if definitions.is_empty() {
            definitions = default_stage_definitions();
        }
        Self {
            definitions,
            matching_min_words,
        }
    }

    /// Stage 1 current, everything else locked.
    pub fn initial_state(&self) -> ProgressState {
        self.restore(ProgressState {
            stages: Vec::new(),
            completed_modes: BTreeMap::new(),
            completed_at: BTreeMap::new(),
            active_stage: None,
            earned_points: 0,
        })
    }

    /// Practice modes offered for a vocabulary of `word_count` words.
    pub fn available_modes(&self, word_count: usize) -> Vec<PracticeMode> {
        let mut modes = vec![PracticeMode::Standard];
        if word_count >= self.matching_min_words {
            modes.push(PracticeMode::Matching);
        }
        modes.extend([PracticeMode::FillInWord, PracticeMode::FillInMeaning]);
        modes
    }

    /// Repair a persisted snapshot so that it satisfies the state invariants:
    /// all configured stages present in order, stage 1 never locked, the stage
    /// after a completed one never locked, and exactly one current stage unless
    /// every stage is completed.
    pub fn restore(&self, snapshot: ProgressState) -> ProgressState {
        let mut stages: Vec<StageDefinition> = self
            .definitions
            .iter()
            .map(|def| StageDefinition {
                status: snapshot.status(def.id).unwrap_or(StageStatus::Locked),
                ..def.clone()
            })
            .collect();

        if let Some(first) = stages.first_mut() {
            if first.status == StageStatus::Locked {
                first.status = StageStatus::Unlocked;
            }
        }
        for i in 1..stages.len() {
            if stages[i - 1].status == StageStatus::Completed
                && stages[i].status == StageStatus::Locked
            {
                stages[i].status = StageStatus::Unlocked;
            }
        }

        let mut seen_current = false;
        for stage in stages.iter_mut() {
            if stage.status == StageStatus::Current {
                if seen_current {
                    stage.status = StageStatus::Unlocked;
                }
                seen_current = true;
            }
        }
        if !seen_current {
            if let Some(stage) = stages.iter_mut().find(|s| s.status == StageStatus::Unlocked) {
                stage.status = StageStatus::Current;
            }
        }

        let known = |id: &StageId| stages.iter().any(|s| s.id == *id);
        let completed_modes = snapshot
            .completed_modes
            .into_iter()
            .filter(|(id, _)| known(id))
            .collect();
        let completed_at = snapshot
            .completed_at
            .into_iter()
            .filter(|(id, _)| {
                stages
                    .iter()
                    .any(|s| s.id == *id && s.status == StageStatus::Completed)
            })
            .collect();
        let earned_points = stages
            .iter()
            .filter(|s| s.status == StageStatus::Completed)
            .map(|s| s.reward_points)
            .sum();

        let mut state = ProgressState {
            stages,
            completed_modes,
            completed_at,
            active_stage: None,
            earned_points,
        };
        state.active_stage = snapshot
            .active_stage
            .filter(|id| matches!(state.status(*id), Some(s) if s != StageStatus::Locked))
            .or_else(|| state.current_stage());
        state
    }

    /// Enter a stage. An unlocked stage becomes the current one; a completed
    /// stage is revisited without changing any status. Locked or unknown
    /// stages are ignored.
    pub fn start_stage(&self, mut state: ProgressState, id: StageId) -> ProgressState {
        let Some(pos) = state.position(id) else {
            log::warn!("Ignoring start of unknown stage {}", id);
            return state;
        };

        match state.stages[pos].status {
            StageStatus::Locked => {
                log::warn!("Ignoring start of locked stage {}", id);
                return state;
            }
            StageStatus::Unlocked => {
                state.demote_current_except(pos);
                state.stages[pos].status = StageStatus::Current;
            }
            StageStatus::Current | StageStatus::Completed => {}
        }

        state.active_stage = Some(id);
        state
    }

    /// Record that `mode` was completed on stage `id`. The first completion of
    /// a stage marks it completed and makes the next stage current.
    pub fn complete_mode(
        &self,
        mut state: ProgressState,
        id: StageId,
        mode: PracticeMode,
    ) -> StageTransition {
        let Some(pos) = state.position(id) else {
            log::warn!("Ignoring completion of unknown stage {}", id);
            return StageTransition::unchanged(state);
        };
        if state.stages[pos].status == StageStatus::Locked {
            log::warn!("Ignoring completion of locked stage {}", id);
            return StageTransition::unchanged(state);
        }

        state.completed_modes.entry(id).or_default().insert(mode);
        if state.stages[pos].status == StageStatus::Completed {
            return StageTransition::unchanged(state);
        }

        state.stages[pos].status = StageStatus::Completed;
        state.completed_at.insert(id, Utc::now());
        state.earned_points += state.stages[pos].reward_points;

        let mut promoted = None;
        if let Some(next) = state.stages.get_mut(pos + 1) {
            if matches!(next.status, StageStatus::Locked | StageStatus::Unlocked) {
                next.status = StageStatus::Current;
                promoted = Some(next.id);
                state.demote_current_except(pos + 1);
            }
        }

        if state.current_stage().is_none() {
            if let Some(stage) = state
                .stages
                .iter_mut()
                .find(|s| s.status == StageStatus::Unlocked)
            {
                stage.status = StageStatus::Current;
                promoted = Some(stage.id);
            }
        }

        if promoted.is_some() {
            state.active_stage = promoted;
        }

        let victory = state.is_victory();
        if victory {
            log::info!("All {} stages completed", state.stages.len());
        }

        StageTransition {
            state,
            newly_completed: true,
            promoted,
            victory,
        }
    }
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;

    use super::{PracticeMode, ProgressState, StageId, StageProgressionEngine};

    fn runtime_error(e: impl std::fmt::Display) -> PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
    }

    fn parse_state(state_json: &str) -> PyResult<ProgressState> {
        let snapshot = serde_json::from_str(state_json)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(StageProgressionEngine::default().restore(snapshot))
    }

    #[pyfunction]
    #[pyo3(name = "initial_progress")]
    pub fn py_initial_progress() -> PyResult<String> {
        let state = StageProgressionEngine::default().initial_state();
        serde_json::to_string(&state).map_err(runtime_error)
    }

    #[pyfunction]
    #[pyo3(name = "restore_progress")]
    pub fn py_restore_progress(state_json: &str) -> PyResult<String> {
        serde_json::to_string(&parse_state(state_json)?).map_err(runtime_error)
    }

    #[pyfunction]
    #[pyo3(name = "start_stage")]
    pub fn py_start_stage(state_json: &str, stage: StageId) -> PyResult<String> {
        let state = StageProgressionEngine::default().start_stage(parse_state(state_json)?, stage);
        serde_json::to_string(&state).map_err(runtime_error)
    }

    /// `mode` is one of `standard`, `matching`, `fill-in-word`, `fill-in-meaning`.
    #[pyfunction]
    #[pyo3(name = "complete_mode")]
    pub fn py_complete_mode(state_json: &str, stage: StageId, mode: &str) -> PyResult<String> {
        let mode: PracticeMode = serde_json::from_value(serde_json::Value::String(mode.to_string()))
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        let state = parse_state(state_json)?;
        let transition = StageProgressionEngine::default().complete_mode(state, stage, mode);
        serde_json::to_string(&transition).map_err(runtime_error)
    }

    #[pyfunction]
    #[pyo3(name = "available_modes")]
    pub fn py_available_modes(word_count: usize) -> PyResult<String> {
        let modes = StageProgressionEngine::default().available_modes(word_count);
        serde_json::to_string(&modes).map_err(runtime_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageStatus::*;

    fn engine() -> StageProgressionEngine {
        StageProgressionEngine::default()
    }

    #[test]
    fn test_initial_state() {
        let state = engine().initial_state();
        assert_eq!(state.statuses(), vec![Current, Locked, Locked, Locked, Locked]);
        assert_eq!(state.active_stage(), Some(1));
        assert_eq!(state.earned_points(), 0);
        assert!(!state.is_victory());
    }

    #[test]
    fn test_completing_stage_one_promotes_stage_two() {
        let engine = engine();
        let transition = engine.complete_mode(engine.initial_state(), 1, PracticeMode::Matching);

        assert_eq!(
            transition.state.statuses(),
            vec![Completed, Current, Locked, Locked, Locked]
        );
        assert!(transition.newly_completed);
        assert_eq!(transition.promoted, Some(2));
        assert_eq!(transition.state.active_stage(), Some(2));
        assert_eq!(transition.state.earned_points(), 100);
        assert!(transition.state.completed_at(1).is_some());
        assert!(!transition.victory);
    }

    #[test]
    fn test_modes_tracked_per_stage_without_second_transition() {
        let engine = engine();
        let state = engine.complete_mode(engine.initial_state(), 1, PracticeMode::Standard).state;
        let state = engine.start_stage(state, 1);
        assert_eq!(state.active_stage(), Some(1));
        assert_eq!(state.current_stage(), Some(2));

        let transition = engine.complete_mode(state, 1, PracticeMode::Matching);
        assert!(!transition.newly_completed);
        assert_eq!(transition.promoted, None);
        assert_eq!(
            transition.state.completed_modes(1),
            [PracticeMode::Standard, PracticeMode::Matching].into_iter().collect()
        );
        assert_eq!(
            transition.state.statuses(),
            vec![Completed, Current, Locked, Locked, Locked]
        );
        assert_eq!(transition.state.earned_points(), 100);
    }

    #[test]
    fn test_locked_and_unknown_stages_ignored() {
        let engine = engine();
        let initial = engine.initial_state();

        let transition = engine.complete_mode(initial.clone(), 3, PracticeMode::Standard);
        assert_eq!(transition.state, initial);
        assert!(!transition.newly_completed);

        let transition = engine.complete_mode(initial.clone(), 9, PracticeMode::Standard);
        assert_eq!(transition.state, initial);

        assert_eq!(engine.start_stage(initial.clone(), 4), initial);
    }

    #[test]
    fn test_victory_after_all_stages() {
        let engine = engine();
        let mut state = engine.initial_state();
        let mut last = None;
        for id in STAGE_IDS {
            let transition = engine.complete_mode(state, id, PracticeMode::Standard);
            state = transition.state.clone();
            last = Some(transition);
        }

        let last = last.unwrap();
        assert!(last.victory);
        assert_eq!(last.promoted, None);
        assert!(state.is_victory());
        assert_eq!(state.current_stage(), None);
        assert_eq!(state.earned_points(), 100 + 150 + 200 + 250 + 500);
    }

    #[test]
    fn test_exactly_one_current_stage() {
        let engine = engine();
        let mut state = engine.initial_state();
        for id in [1, 2, 1, 3, 2] {
            state = engine.complete_mode(state, id, PracticeMode::FillInWord).state;
            state = engine.start_stage(state, id);
            let current = state.statuses().iter().filter(|s| **s == Current).count();
            assert!(current == 1 || state.is_victory());
        }
    }

    #[test]
    fn test_restore_repairs_degenerate_snapshots() {
        let engine = engine();
        let snapshot: ProgressState = serde_json::from_value(serde_json::json!({
            "stages": [
                {"id": 1, "title": "x", "status": "completed", "rewardPoints": 1},
                {"id": 2, "title": "x", "status": "locked", "rewardPoints": 1},
                {"id": 3, "title": "x", "status": "current", "rewardPoints": 1},
                {"id": 4, "title": "x", "status": "current", "rewardPoints": 1}
            ],
            "completedModes": {"1": ["standard"], "9": ["matching"]},
            "earnedPoints": 9999
        }))
        .unwrap();

        let state = engine.restore(snapshot);
        assert_eq!(state.statuses(), vec![Completed, Unlocked, Current, Unlocked, Locked]);
        assert_eq!(state.stages()[0].title, "Meanings");
        assert_eq!(state.earned_points(), 100);
        assert_eq!(state.completed_modes(1), [PracticeMode::Standard].into_iter().collect());
        assert!(state.completed_modes(9).is_empty());
        assert_eq!(state.active_stage(), Some(3));
    }

    #[test]
    fn test_restore_empty_snapshot_starts_fresh() {
        let engine = engine();
        let snapshot: ProgressState = serde_json::from_str(r#"{"stages": []}"#).unwrap();
        assert_eq!(engine.restore(snapshot), engine.initial_state());
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let engine = engine();
        let state = engine.complete_mode(engine.initial_state(), 1, PracticeMode::Standard).state;
        let json = serde_json::to_string(&state).unwrap();
        let restored = engine.restore(serde_json::from_str(&json).unwrap());
        assert_eq!(restored, state);
    }

    #[test]
    fn test_matching_needs_minimum_words() {
        let engine = engine();
        assert!(!engine.available_modes(4).contains(&PracticeMode::Matching));
        assert!(engine.available_modes(5).contains(&PracticeMode::Matching));
        assert_eq!(engine.available_modes(0)[0], PracticeMode::Standard);
    }
}
