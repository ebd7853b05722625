//! Narrative Types
//!
//! Multi-chapter story arcs and the per-session context that tracks them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::condition::Condition;
use crate::game_state::FlagValue;

/// Trust values are kept in this range.
pub const TRUST_MIN: i32 = -100;
/// Upper trust bound.
pub const TRUST_MAX: i32 = 100;

/// How an NPC feels about the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Attitude {
    Hostile,
    Wary,
    #[default]
    Neutral,
    Friendly,
    Loyal,
}

/// A single recorded interaction with an NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcInteraction {
    /// Scenario where the interaction happened
    pub scenario_id: String,
    /// Trust change applied
    pub trust_delta: i32,
    /// Turn of the interaction
    pub turn: u32,
}

/// The player's relationship with one NPC.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NpcRelationship {
    pub trust: i32,
    pub attitude: Attitude,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<NpcInteraction>,
}

impl NpcRelationship {
    /// Adjusts trust, clamped to the trust range.
    pub fn adjust_trust(&mut self, delta: i32) {
        self.trust = (self.trust.saturating_add(delta)).clamp(TRUST_MIN, TRUST_MAX);
    }
}

/// NPC trust/attitude change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcEffect {
    pub npc: String,
    #[serde(default)]
    pub trust: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attitude: Option<Attitude>,
}

/// Effects applied when a chapter completes or an ending fires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeEffects {
    /// Global game flags to set
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, FlagValue>,
    /// Narrative-only flags to set
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub narrative_flags: BTreeMap<String, bool>,
    /// NPC relationship changes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub npc: Vec<NpcEffect>,
    /// Stat deltas (ending rewards)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fx: BTreeMap<String, f64>,
}

impl NarrativeEffects {
    /// Returns true if applying these effects changes nothing.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
            && self.narrative_flags.is_empty()
            && self.npc.is_empty()
            && self.fx.is_empty()
    }
}

/// One step of a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Scenario presented for this chapter
    pub scenario_id: String,
    /// Trigger conditions, all must hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub on_complete: NarrativeEffects,
}

/// A terminal outcome of a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ending {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub rewards: NarrativeEffects,
}

/// A multi-chapter story arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeThread {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Conditions that must hold before the thread can start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_conditions: Vec<Condition>,
    /// Scenario that must be completed before the thread can start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_scenario: Option<String>,
    pub chapters: Vec<Chapter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endings: Vec<Ending>,
}

impl NarrativeThread {
    /// Returns the chapter at the given index.
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Returns true if any chapter presents the given scenario.
    pub fn uses_scenario(&self, scenario_id: &str) -> bool {
        self.chapters.iter().any(|c| c.scenario_id == scenario_id)
    }
}

/// Outcome of a thread that has left the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedThread {
    /// Ending that fired, `None` when the chapters ran out first
    pub ending: Option<String>,
    /// Turn the thread concluded
    pub turn: u32,
}

/// Per-session narrative bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeContext {
    /// Active thread ids, primary thread first
    #[serde(default)]
    pub active_threads: Vec<String>,
    /// Next chapter index per active thread
    #[serde(default)]
    pub chapter_index: BTreeMap<String, usize>,
    #[serde(default)]
    pub completed_threads: BTreeMap<String, CompletedThread>,
    #[serde(default)]
    pub npcs: BTreeMap<String, NpcRelationship>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl NarrativeContext {
    /// Returns true if the thread is in the active set.
    pub fn is_active(&self, thread_id: &str) -> bool {
        self.active_threads.iter().any(|t| t == thread_id)
    }

    /// Returns true if the thread has concluded.
    pub fn is_completed(&self, thread_id: &str) -> bool {
        self.completed_threads.contains_key(thread_id)
    }

    /// The primary (oldest) active thread.
    pub fn primary_thread(&self) -> Option<&str> {
        self.active_threads.first().map(String::as_str)
    }

    /// Adds a thread to the active set at chapter 0.
    pub fn activate(&mut self, thread_id: &str) {
        if !self.is_active(thread_id) {
            self.active_threads.push(thread_id.to_string());
            self.chapter_index.insert(thread_id.to_string(), 0);
        }
    }

    /// Removes a thread from the active set and records its outcome.
    pub fn conclude(&mut self, thread_id: &str, ending: Option<String>, turn: u32) {
        self.active_threads.retain(|t| t != thread_id);
        self.chapter_index.remove(thread_id);
        self.completed_threads
            .insert(thread_id.to_string(), CompletedThread { ending, turn });
    }

    /// Returns the relationship with an NPC, if one exists.
    pub fn npc(&self, npc_id: &str) -> Option<&NpcRelationship> {
        self.npcs.get(npc_id)
    }

    /// Returns the relationship with an NPC, creating a neutral one if needed.
    pub fn npc_mut(&mut self, npc_id: &str) -> &mut NpcRelationship {
        self.npcs.entry(npc_id.to_string()).or_default()
    }
}
