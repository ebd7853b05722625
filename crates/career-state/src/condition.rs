//! Branch Condition Types
//!
//! Recursive predicate trees used by scenario branches, narrative threads,
//! and achievement rules. Evaluation lives in the engine crate; this module
//! only describes the shape.

use serde::{Deserialize, Serialize};

use crate::narrative::Attitude;
use crate::stats::EmotionalState;

/// A boolean predicate over player state.
///
/// Serialized with a `type` tag, e.g.
/// `{"type": "stat", "stat": "coding", "min": 40}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Stat (or engine metric) within inclusive optional bounds
    Stat {
        stat: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Stat exactly equal to a value
    StatEqual { stat: String, value: f64 },
    /// Flag equals a boolean; a missing flag reads as `false`
    Flag {
        flag: String,
        #[serde(default = "default_true")]
        value: bool,
    },
    /// Emotional state matches
    Emotional { state: EmotionalState },
    /// Relationship with an NPC meets a trust floor and/or attitude
    NpcRelation {
        npc: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_trust: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attitude: Option<Attitude>,
    },
    /// Scenario appears in history, optionally with a specific choice
    EventHistory {
        scenario: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        choice: Option<String>,
    },
    /// Thread is currently active
    ThreadActive { thread: String },
    /// All sub-conditions hold (empty is true)
    And { conditions: Vec<Condition> },
    /// At least one sub-condition holds (empty is false)
    Or { conditions: Vec<Condition> },
    /// Negation
    Not { condition: Box<Condition> },
}

fn default_true() -> bool {
    true
}

impl Condition {
    /// Stat at or above a minimum.
    pub fn stat_at_least(stat: impl Into<String>, min: f64) -> Self {
        Condition::Stat {
            stat: stat.into(),
            min: Some(min),
            max: None,
        }
    }

    /// Stat at or below a maximum.
    pub fn stat_at_most(stat: impl Into<String>, max: f64) -> Self {
        Condition::Stat {
            stat: stat.into(),
            min: None,
            max: Some(max),
        }
    }

    /// Flag set to true.
    pub fn flag(flag: impl Into<String>) -> Self {
        Condition::Flag {
            flag: flag.into(),
            value: true,
        }
    }

    /// Scenario completed with any choice.
    pub fn completed(scenario: impl Into<String>) -> Self {
        Condition::EventHistory {
            scenario: scenario.into(),
            choice: None,
        }
    }

    /// Conjunction of conditions.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    /// Disjunction of conditions.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    /// Negation.
    pub fn negate(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }
}
