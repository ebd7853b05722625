//! Scenario and Choice Types
//!
//! Authored narrative beats, the options they offer, and the conditional
//! branches that override their content at render time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::condition::Condition;
use crate::game_state::FlagValue;
use crate::stats::EmotionalState;

/// Lifecycle phase a scenario belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Character creation and onboarding
    Setup,
    /// Job hunt pipeline
    #[default]
    Hunt,
    /// Employed play
    Game,
}

/// Difficulty tier used for stage-band weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Flag directive carried by a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSet {
    pub name: String,
    #[serde(default = "FlagSet::default_value")]
    pub value: FlagValue,
}

impl FlagSet {
    fn default_value() -> FlagValue {
        FlagValue::Bool(true)
    }
}

/// A player-selectable option.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Stat key -> delta
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fx: BTreeMap<String, f64>,
    /// Skill receiving a randomized one-shot bonus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_bonus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_flag: Option<FlagSet>,
    /// Role transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Phase transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// Explicit emotional state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionalState>,
    /// Energy cost on a 0–100 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_cost: Option<f64>,
    /// Time cost in months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_cost: Option<f64>,
    /// Scripted stage jump
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<u32>,
    /// Pipeline progress contribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunt_progress: Option<u32>,
}

impl Choice {
    /// Creates a choice with no effects.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Adds a stat delta.
    pub fn with_fx(mut self, stat: impl Into<String>, delta: f64) -> Self {
        self.fx.insert(stat.into(), delta);
        self
    }

    /// Sets the progress contribution.
    pub fn with_progress(mut self, progress: u32) -> Self {
        self.hunt_progress = Some(progress);
        self
    }

    /// Sets the energy cost (0–100 scale).
    pub fn with_energy_cost(mut self, cost: f64) -> Self {
        self.energy_cost = Some(cost);
        self
    }

    /// Sets the time cost in months.
    pub fn with_time_cost(mut self, months: f64) -> Self {
        self.time_cost = Some(months);
        self
    }

    /// Sets a flag to true.
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.set_flag = Some(FlagSet {
            name: name.into(),
            value: FlagValue::Bool(true),
        });
        self
    }

    /// Sets the role transition.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Stage gate, both bounds inclusive and optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageGate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stage: Option<u32>,
}

impl StageGate {
    /// Returns true if the stage falls within the gate.
    pub fn admits(&self, stage: u32) -> bool {
        self.min_stage.map_or(true, |min| stage >= min)
            && self.max_stage.map_or(true, |max| stage <= max)
    }
}

/// Conditional content override.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Branch {
    /// All must hold for the branch to apply
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

/// An authored narrative beat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Role lock; empty means any role
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Stat key -> minimum value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requires: BTreeMap<String, f64>,
    #[serde(default)]
    pub gate: StageGate,
    /// Turns before re-eligible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Branch>,
}

impl Scenario {
    /// Creates a hunt-phase scenario with no metadata.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Adds a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Sets the difficulty tier.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Adds tags.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Sets the phase.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Sets the cooldown.
    pub fn with_cooldown(mut self, turns: u32) -> Self {
        self.cooldown = Some(turns);
        self
    }

    /// Adds a branch.
    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    /// Returns true if the role lock admits the role.
    pub fn allows_role(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| r == role)
    }

    /// Finds a base-content choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_gate() {
        let gate = StageGate {
            min_stage: Some(1),
            max_stage: Some(3),
        };
        assert!(!gate.admits(0));
        assert!(gate.admits(1));
        assert!(gate.admits(3));
        assert!(!gate.admits(4));
        assert!(StageGate::default().admits(99));
    }

    #[test]
    fn test_role_lock() {
        let mut scenario = Scenario::new("standup", "Daily standup");
        assert!(scenario.allows_role("anyone"));

        scenario.roles = vec!["junior".to_string(), "senior".to_string()];
        assert!(scenario.allows_role("senior"));
        assert!(!scenario.allows_role("unemployed"));
    }

    #[test]
    fn test_scenario_parses_minimal_json() {
        let json = r#"{
            "id": "recruiter_call",
            "phase": "hunt",
            "title": "A recruiter calls",
            "choices": [
                {"id": "answer", "text": "Pick up", "fx": {"networking": 2}, "hunt_progress": 8}
            ],
            "difficulty": "beginner",
            "gate": {"max_stage": 2}
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();

        assert_eq!(scenario.phase, Phase::Hunt);
        assert_eq!(scenario.difficulty, Some(Difficulty::Beginner));
        assert_eq!(scenario.gate.max_stage, Some(2));
        let choice = scenario.choice("answer").unwrap();
        assert_eq!(choice.hunt_progress, Some(8));
        assert_eq!(choice.fx.get("networking"), Some(&2.0));
    }

    #[test]
    fn test_flag_set_defaults_to_true() {
        let choice: Choice =
            serde_json::from_str(r#"{"id": "c", "set_flag": {"name": "met_cto"}}"#).unwrap();
        assert_eq!(
            choice.set_flag,
            Some(FlagSet {
                name: "met_cto".to_string(),
                value: FlagValue::Bool(true)
            })
        );
    }
}
