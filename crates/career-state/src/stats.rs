//! Player Stat Types
//!
//! The numeric profile of a player and the range each stat lives in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ceiling for behavioral attributes (confidence, grit, aggression).
pub const BEHAVIORAL_MAX: f64 = 200.0;

/// Declared valid range of a stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatRange {
    /// Lower bound, `None` when the stat may go negative
    pub min: Option<f64>,
    /// Upper bound, `None` when unbounded
    pub max: Option<f64>,
}

impl StatRange {
    /// Non-negative and unbounded above.
    pub const NON_NEGATIVE: StatRange = StatRange {
        min: Some(0.0),
        max: None,
    };
    /// Percentage-style stat on a 0–1 scale.
    pub const UNIT: StatRange = StatRange {
        min: Some(0.0),
        max: Some(1.0),
    };
    /// Behavioral attribute range.
    pub const BEHAVIORAL: StatRange = StatRange {
        min: Some(0.0),
        max: Some(BEHAVIORAL_MAX),
    };
    /// No bounds at all (debt is allowed).
    pub const UNBOUNDED: StatRange = StatRange {
        min: None,
        max: None,
    };

    /// Clamps a value into this range.
    pub fn clamp(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}

/// Grouping used for range rules and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatGroup {
    Technical,
    Soft,
    Financial,
    Wellbeing,
    Behavioral,
    Hidden,
}

/// Every numeric stat the player carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Coding,
    SystemDesign,
    Algorithms,
    Debugging,
    Communication,
    Networking,
    Leadership,
    Negotiation,
    Savings,
    Salary,
    BurnRate,
    Energy,
    Stress,
    Confidence,
    Grit,
    Aggression,
    Reputation,
    Ethics,
}

impl Stat {
    /// Returns all stat variants.
    pub fn all() -> &'static [Stat] {
        &[
            Stat::Coding,
            Stat::SystemDesign,
            Stat::Algorithms,
            Stat::Debugging,
            Stat::Communication,
            Stat::Networking,
            Stat::Leadership,
            Stat::Negotiation,
            Stat::Savings,
            Stat::Salary,
            Stat::BurnRate,
            Stat::Energy,
            Stat::Stress,
            Stat::Confidence,
            Stat::Grit,
            Stat::Aggression,
            Stat::Reputation,
            Stat::Ethics,
        ]
    }

    /// Returns the snake_case key used in authored content.
    pub fn key(self) -> &'static str {
        match self {
            Stat::Coding => "coding",
            Stat::SystemDesign => "system_design",
            Stat::Algorithms => "algorithms",
            Stat::Debugging => "debugging",
            Stat::Communication => "communication",
            Stat::Networking => "networking",
            Stat::Leadership => "leadership",
            Stat::Negotiation => "negotiation",
            Stat::Savings => "savings",
            Stat::Salary => "salary",
            Stat::BurnRate => "burn_rate",
            Stat::Energy => "energy",
            Stat::Stress => "stress",
            Stat::Confidence => "confidence",
            Stat::Grit => "grit",
            Stat::Aggression => "aggression",
            Stat::Reputation => "reputation",
            Stat::Ethics => "ethics",
        }
    }

    /// Looks up a stat by its content key. Unknown keys return `None`.
    pub fn from_key(key: &str) -> Option<Stat> {
        Stat::all().iter().copied().find(|s| s.key() == key)
    }

    /// Returns the group this stat belongs to.
    pub fn group(self) -> StatGroup {
        match self {
            Stat::Coding | Stat::SystemDesign | Stat::Algorithms | Stat::Debugging => {
                StatGroup::Technical
            }
            Stat::Communication | Stat::Networking | Stat::Leadership | Stat::Negotiation => {
                StatGroup::Soft
            }
            Stat::Savings | Stat::Salary | Stat::BurnRate => StatGroup::Financial,
            Stat::Energy | Stat::Stress => StatGroup::Wellbeing,
            Stat::Confidence | Stat::Grit | Stat::Aggression => StatGroup::Behavioral,
            Stat::Reputation | Stat::Ethics => StatGroup::Hidden,
        }
    }

    /// Returns the declared valid range.
    pub fn range(self) -> StatRange {
        match self {
            Stat::Savings => StatRange::UNBOUNDED,
            Stat::Energy | Stat::Stress => StatRange::UNIT,
            s if s.group() == StatGroup::Behavioral => StatRange::BEHAVIORAL,
            _ => StatRange::NON_NEGATIVE,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Categorical mood of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    #[default]
    Calm,
    Motivated,
    Anxious,
    Stressed,
    Exhausted,
    Confident,
}

/// The player's numeric profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub coding: f64,
    pub system_design: f64,
    pub algorithms: f64,
    pub debugging: f64,
    pub communication: f64,
    pub networking: f64,
    pub leadership: f64,
    pub negotiation: f64,
    pub savings: f64,
    pub salary: f64,
    pub burn_rate: f64,
    pub energy: f64,
    pub stress: f64,
    pub confidence: f64,
    pub grit: f64,
    pub aggression: f64,
    pub reputation: f64,
    pub ethics: f64,
}

impl Default for StateVector {
    fn default() -> Self {
        Self {
            coding: 20.0,
            system_design: 10.0,
            algorithms: 15.0,
            debugging: 15.0,
            communication: 20.0,
            networking: 10.0,
            leadership: 5.0,
            negotiation: 5.0,
            savings: 12_000.0,
            salary: 0.0,
            burn_rate: 2_000.0,
            energy: 0.8,
            stress: 0.2,
            confidence: 100.0,
            grit: 100.0,
            aggression: 50.0,
            reputation: 10.0,
            ethics: 50.0,
        }
    }
}

impl StateVector {
    /// Reads a stat value.
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Coding => self.coding,
            Stat::SystemDesign => self.system_design,
            Stat::Algorithms => self.algorithms,
            Stat::Debugging => self.debugging,
            Stat::Communication => self.communication,
            Stat::Networking => self.networking,
            Stat::Leadership => self.leadership,
            Stat::Negotiation => self.negotiation,
            Stat::Savings => self.savings,
            Stat::Salary => self.salary,
            Stat::BurnRate => self.burn_rate,
            Stat::Energy => self.energy,
            Stat::Stress => self.stress,
            Stat::Confidence => self.confidence,
            Stat::Grit => self.grit,
            Stat::Aggression => self.aggression,
            Stat::Reputation => self.reputation,
            Stat::Ethics => self.ethics,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut f64 {
        match stat {
            Stat::Coding => &mut self.coding,
            Stat::SystemDesign => &mut self.system_design,
            Stat::Algorithms => &mut self.algorithms,
            Stat::Debugging => &mut self.debugging,
            Stat::Communication => &mut self.communication,
            Stat::Networking => &mut self.networking,
            Stat::Leadership => &mut self.leadership,
            Stat::Negotiation => &mut self.negotiation,
            Stat::Savings => &mut self.savings,
            Stat::Salary => &mut self.salary,
            Stat::BurnRate => &mut self.burn_rate,
            Stat::Energy => &mut self.energy,
            Stat::Stress => &mut self.stress,
            Stat::Confidence => &mut self.confidence,
            Stat::Grit => &mut self.grit,
            Stat::Aggression => &mut self.aggression,
            Stat::Reputation => &mut self.reputation,
            Stat::Ethics => &mut self.ethics,
        }
    }

    /// Writes a stat value, clamped to its declared range.
    pub fn set(&mut self, stat: Stat, value: f64) {
        let clamped = if value.is_nan() {
            stat.range().clamp(0.0)
        } else {
            stat.range().clamp(value)
        };
        *self.slot(stat) = clamped;
    }

    /// Adds a delta to a stat and returns the applied (post-clamp) change.
    pub fn add(&mut self, stat: Stat, delta: f64) -> f64 {
        let before = self.get(stat);
        self.set(stat, before + delta);
        self.get(stat) - before
    }

    /// Looks up a stat by content key.
    pub fn get_by_key(&self, key: &str) -> Option<f64> {
        Stat::from_key(key).map(|s| self.get(s))
    }

    /// Returns the largest absolute difference between two profiles.
    ///
    /// Financial stats are in currency units and move by hundreds on any
    /// turn with a time cost, so they are left out.
    pub fn max_swing(&self, other: &StateVector) -> f64 {
        Stat::all()
            .iter()
            .filter(|s| s.group() != StatGroup::Financial)
            .map(|&s| (self.get(s) - other.get(s)).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_keys_round_trip() {
        for &stat in Stat::all() {
            assert_eq!(Stat::from_key(stat.key()), Some(stat));
        }
        assert_eq!(Stat::from_key("charisma"), None);
    }

    #[test]
    fn test_stat_serialization_matches_key() {
        assert_eq!(
            serde_json::to_string(&Stat::SystemDesign).unwrap(),
            r#""system_design""#
        );
        assert_eq!(
            serde_json::to_string(&Stat::BurnRate).unwrap(),
            r#""burn_rate""#
        );
    }

    #[test]
    fn test_ranges() {
        assert_eq!(Stat::Savings.range(), StatRange::UNBOUNDED);
        assert_eq!(Stat::Energy.range(), StatRange::UNIT);
        assert_eq!(Stat::Grit.range(), StatRange::BEHAVIORAL);
        assert_eq!(Stat::Coding.range(), StatRange::NON_NEGATIVE);
    }

    #[test]
    fn test_set_clamps() {
        let mut v = StateVector::default();

        v.set(Stat::Energy, 1.7);
        assert_eq!(v.energy, 1.0);

        v.set(Stat::Stress, -0.3);
        assert_eq!(v.stress, 0.0);

        v.set(Stat::Confidence, 250.0);
        assert_eq!(v.confidence, 200.0);

        v.set(Stat::Coding, -5.0);
        assert_eq!(v.coding, 0.0);

        v.set(Stat::Savings, -4_000.0);
        assert_eq!(v.savings, -4_000.0);
    }

    #[test]
    fn test_add_reports_applied_delta() {
        let mut v = StateVector::default();
        v.energy = 0.9;

        let applied = v.add(Stat::Energy, 0.5);
        assert!((applied - 0.1).abs() < 1e-9);
        assert_eq!(v.energy, 1.0);
    }

    #[test]
    fn test_nan_is_absorbed() {
        let mut v = StateVector::default();
        v.set(Stat::Stress, f64::NAN);
        assert_eq!(v.stress, 0.0);
    }

    #[test]
    fn test_max_swing() {
        let a = StateVector::default();
        let mut b = a.clone();
        b.coding += 12.0;
        b.energy -= 0.1;

        assert!((a.max_swing(&b) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_swing_ignores_financial() {
        let a = StateVector::default();
        let mut b = a.clone();
        b.savings -= 500.0;
        b.salary += 60_000.0;
        b.stress += 0.2;

        assert!((a.max_swing(&b) - 0.2).abs() < 1e-9);
    }
}
