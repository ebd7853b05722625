//! Turn notifications.
//!
//! Everything noteworthy a turn produced, for the presentation layer.

use serde::{Deserialize, Serialize};

use career_state::{Phase, Stat};

use crate::achievements::Tier;

/// Something a turn produced that the player should hear about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Randomized skill bonus landed
    SkillBonus { stat: Stat, amount: u32 },
    /// Prorated salary paid into savings
    SalaryPaid { amount: f64 },
    /// Prorated living costs deducted from savings
    LivingCosts { amount: f64 },
    /// Pipeline stage moved forward
    StageAdvanced { from: u32, to: u32 },
    /// Momentum switched on; boosts from the next turn
    MomentumActivated { streak: u32 },
    /// Momentum switched off
    MomentumLost,
    RoleChanged { from: String, to: String },
    PhaseChanged { from: Phase, to: Phase },
    /// Stress fell back below the recovery line after a peak
    StressRecovered,
    AchievementUnlocked {
        id: String,
        title: String,
        tier: Tier,
        hidden: bool,
    },
    ThreadStarted { thread_id: String },
    ChapterCompleted { thread_id: String, scenario_id: String },
    ThreadConcluded {
        thread_id: String,
        ending: Option<String>,
    },
}

impl Notification {
    /// Returns true for achievement unlocks.
    pub fn is_achievement(&self) -> bool {
        matches!(self, Notification::AchievementUnlocked { .. })
    }
}
