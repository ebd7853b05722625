//! Game State
//!
//! The full per-session state: the stat profile plus pipeline position,
//! recency windows, cooldowns, momentum, flags, history, unlocked
//! achievements, and narrative context. Everything here must survive a
//! save/resume cycle unchanged, since selection depends on all of it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::narrative::NarrativeContext;
use crate::scenario::Phase;
use crate::stats::{EmotionalState, StateVector};

/// Default capacity of the recent-scenario window.
pub const DEFAULT_RECENT_SCENARIOS: usize = 5;

/// Default capacity of the recent-tag window.
pub const DEFAULT_RECENT_TAGS: usize = 3;

/// Role a fresh character starts in.
pub const STARTING_ROLE: &str = "unemployed";

/// A flag value: boolean or numeric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
}

impl FlagValue {
    /// Truthiness: `true`, or any non-zero number.
    pub fn is_truthy(&self) -> bool {
        match *self {
            FlagValue::Bool(b) => b,
            FlagValue::Number(n) => n != 0.0,
        }
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        FlagValue::Bool(b)
    }
}

impl From<f64> for FlagValue {
    fn from(n: f64) -> Self {
        FlagValue::Number(n)
    }
}

/// Fixed-capacity window, newest entry first; the oldest is evicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentWindow {
    capacity: usize,
    entries: VecDeque<String>,
}

impl RecentWindow {
    /// Creates an empty window.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Pushes an entry at the front, evicting from the back.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push_front(entry.into());
        self.entries.truncate(self.capacity);
    }

    /// Returns true if the window holds the entry.
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Progress streak mechanic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Momentum {
    /// Consecutive turns at or above the threshold
    pub streak: u32,
    /// Boost applies to the next contribution
    pub active: bool,
    /// Times momentum has switched on
    pub triggers: u32,
}

/// Counters read only by achievement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviorCounters {
    pub low_stress_streak: u32,
    pub high_energy_streak: u32,
    /// Stress has hit the peak threshold and not yet recovered
    pub stress_peaked: bool,
    /// Stress has recovered from a peak at least once
    pub stress_recovered: bool,
}

/// One completed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub scenario_id: String,
    pub choice_id: String,
    pub turn: u32,
}

/// Immutable record of an unlocked achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: String,
    pub unlocked: bool,
    /// In-game month at unlock
    pub unlocked_month: u32,
    pub unlocked_turn: u32,
    #[serde(default)]
    pub hidden: bool,
}

/// Complete engine-level state of one play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub character_name: String,
    pub role: String,
    pub phase: Phase,
    pub stats: StateVector,
    pub emotional_state: EmotionalState,
    /// Turns completed
    pub turn: u32,
    pub months_elapsed: f64,
    /// Pipeline stage (ordinal)
    pub stage: u32,
    /// In-stage progress, 0–100
    pub progress: u32,
    pub recent_scenarios: RecentWindow,
    pub recent_tags: RecentWindow,
    /// Scenario id -> remaining turns
    #[serde(default)]
    pub cooldowns: BTreeMap<String, u32>,
    #[serde(default)]
    pub momentum: Momentum,
    #[serde(default)]
    pub counters: BehaviorCounters,
    #[serde(default)]
    pub flags: BTreeMap<String, FlagValue>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub achievements: BTreeMap<String, AchievementRecord>,
    #[serde(default)]
    pub narrative: NarrativeContext,
}

impl GameState {
    /// Creates a session with seeded defaults.
    pub fn new(character_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            role: role.into(),
            phase: Phase::Hunt,
            stats: StateVector::default(),
            emotional_state: EmotionalState::default(),
            turn: 0,
            months_elapsed: 0.0,
            stage: 0,
            progress: 0,
            recent_scenarios: RecentWindow::new(DEFAULT_RECENT_SCENARIOS),
            recent_tags: RecentWindow::new(DEFAULT_RECENT_TAGS),
            cooldowns: BTreeMap::new(),
            momentum: Momentum::default(),
            counters: BehaviorCounters::default(),
            flags: BTreeMap::new(),
            history: Vec::new(),
            achievements: BTreeMap::new(),
            narrative: NarrativeContext::default(),
        }
    }

    /// Whole in-game months elapsed.
    pub fn month(&self) -> u32 {
        self.months_elapsed.max(0.0).floor() as u32
    }

    /// Returns true if the player draws a salary.
    pub fn is_employed(&self) -> bool {
        self.stats.salary > 0.0
    }

    /// Reads a flag; a missing flag is `None`.
    pub fn flag(&self, name: &str) -> Option<FlagValue> {
        self.flags.get(name).copied()
    }

    /// Truthiness of a flag; missing is `false`.
    pub fn flag_is_set(&self, name: &str) -> bool {
        self.flag(name).is_some_and(|v| v.is_truthy())
    }

    /// Returns true if the scenario was completed, optionally with a choice.
    pub fn has_completed(&self, scenario_id: &str, choice_id: Option<&str>) -> bool {
        self.history.iter().any(|h| {
            h.scenario_id == scenario_id && choice_id.map_or(true, |c| h.choice_id == c)
        })
    }

    /// Returns true if the achievement has been unlocked.
    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.get(id).is_some_and(|r| r.unlocked)
    }

    /// Absolute pipeline position: `stage * 100 + progress`.
    pub fn pipeline_position(&self) -> u64 {
        u64::from(self.stage) * 100 + u64::from(self.progress)
    }

    /// Resolves a stat key or engine metric by name.
    ///
    /// Stats use their content keys. Metrics: `stage`, `progress`, `months`,
    /// `turn`, `momentum_streak`, `momentum_triggers`, `low_stress_streak`,
    /// `high_energy_streak`, `history_len`, `achievements_unlocked`.
    /// Unknown names resolve to `None`.
    pub fn metric(&self, name: &str) -> Option<f64> {
        if let Some(v) = self.stats.get_by_key(name) {
            return Some(v);
        }
        let v = match name {
            "stage" => f64::from(self.stage),
            "progress" => f64::from(self.progress),
            "months" => self.months_elapsed,
            "turn" => f64::from(self.turn),
            "momentum_streak" => f64::from(self.momentum.streak),
            "momentum_triggers" => f64::from(self.momentum.triggers),
            "low_stress_streak" => f64::from(self.counters.low_stress_streak),
            "high_energy_streak" => f64::from(self.counters.high_energy_streak),
            "history_len" => self.history.len() as f64,
            "achievements_unlocked" => {
                self.achievements.values().filter(|r| r.unlocked).count() as f64
            }
            _ => return None,
        };
        Some(v)
    }

    /// Serializes the state to JSON for the persistence layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores a state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
