//! Achievement registry and unlock checks.
//!
//! Unlocking is monotonic: once a record says `unlocked`, the entry is never
//! evaluated again and the record is never altered or removed.

use serde::{Deserialize, Serialize};
use std::fmt;

use career_state::{AchievementRecord, Condition, GameState};

use crate::condition::holds;
use crate::notification::Notification;

/// Achievement rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Achievement grouping for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Career,
    Skills,
    Wellbeing,
    Finance,
    Narrative,
}

/// Pure unlock predicate.
#[derive(Clone)]
pub enum UnlockRule {
    /// Declarative condition tree
    When(Condition),
    /// Hand-written check for things conditions cannot express
    Check(fn(&GameState) -> bool),
}

impl UnlockRule {
    /// Evaluates the rule.
    pub fn is_met(&self, state: &GameState) -> bool {
        match self {
            UnlockRule::When(condition) => holds(condition, state),
            UnlockRule::Check(check) => check(state),
        }
    }
}

impl fmt::Debug for UnlockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlockRule::When(c) => f.debug_tuple("When").field(c).finish(),
            UnlockRule::Check(_) => f.write_str("Check(<fn>)"),
        }
    }
}

/// One entry of the registry.
#[derive(Debug, Clone)]
pub struct AchievementDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tier: Tier,
    pub category: Category,
    /// Shown only after unlock
    pub hidden: bool,
    pub rule: UnlockRule,
}

impl AchievementDefinition {
    /// Creates a visible achievement.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        tier: Tier,
        category: Category,
        rule: UnlockRule,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            tier,
            category,
            hidden: false,
            rule,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the achievement hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Registry of achievement definitions.
#[derive(Debug, Clone, Default)]
pub struct AchievementEngine {
    definitions: Vec<AchievementDefinition>,
}

impl AchievementEngine {
    /// Creates an engine over the given definitions.
    pub fn new(definitions: Vec<AchievementDefinition>) -> Self {
        Self { definitions }
    }

    /// Creates an engine with the built-in catalog.
    pub fn with_default_catalog() -> Self {
        Self::new(default_catalog())
    }

    /// Adds a definition.
    pub fn register(&mut self, definition: AchievementDefinition) {
        self.definitions.push(definition);
    }

    /// Returns all definitions in registry order.
    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    /// Finds a definition by id.
    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Checks every locked entry and returns the newly unlocked records
    /// together with the updated state. The input is left untouched.
    pub fn check_achievements(&self, state: &GameState) -> (Vec<AchievementRecord>, GameState) {
        let mut next = state.clone();
        let unlocked = self.unlock_into(&mut next);
        (unlocked, next)
    }

    /// Checks every locked entry against `state` and stamps unlock records
    /// into it in place.
    pub fn unlock_into(&self, state: &mut GameState) -> Vec<AchievementRecord> {
        let mut unlocked = Vec::new();

        for def in &self.definitions {
            if state.has_achievement(&def.id) {
                continue;
            }
            if !def.rule.is_met(state) {
                continue;
            }

            let record = AchievementRecord {
                id: def.id.clone(),
                unlocked: true,
                unlocked_month: state.month(),
                unlocked_turn: state.turn,
                hidden: def.hidden,
            };
            tracing::info!(
                achievement = %def.id,
                month = record.unlocked_month,
                "Achievement unlocked"
            );
            state.achievements.insert(def.id.clone(), record.clone());
            unlocked.push(record);
        }

        unlocked
    }

    /// Builds the notification for an unlock record.
    pub fn notification_for(&self, record: &AchievementRecord) -> Option<Notification> {
        self.get(&record.id).map(|def| Notification::AchievementUnlocked {
            id: def.id.clone(),
            title: def.title.clone(),
            tier: def.tier,
            hidden: def.hidden,
        })
    }
}

/// The built-in achievement catalog.
pub fn default_catalog() -> Vec<AchievementDefinition> {
    use Category::*;
    use Tier::*;

    vec![
        AchievementDefinition::new(
            "first_steps",
            "First Steps",
            Bronze,
            Career,
            UnlockRule::When(Condition::stat_at_least("history_len", 1.0)),
        )
        .with_description("Make your first decision."),
        AchievementDefinition::new(
            "foot_in_the_door",
            "Foot in the Door",
            Silver,
            Career,
            UnlockRule::When(Condition::stat_at_least("stage", 2.0)),
        )
        .with_description("Reach stage 2 of the hiring pipeline."),
        AchievementDefinition::new(
            "offer_in_hand",
            "Offer in Hand",
            Gold,
            Career,
            UnlockRule::When(Condition::flag("first_offer")),
        )
        .with_description("Land your first offer."),
        AchievementDefinition::new(
            "on_a_roll",
            "On a Roll",
            Bronze,
            Career,
            UnlockRule::When(Condition::stat_at_least("momentum_triggers", 1.0)),
        )
        .with_description("Build momentum for the first time."),
        AchievementDefinition::new(
            "unstoppable",
            "Unstoppable",
            Gold,
            Career,
            UnlockRule::When(Condition::stat_at_least("momentum_triggers", 3.0)),
        )
        .with_description("Build momentum three separate times."),
        AchievementDefinition::new(
            "zen_master",
            "Zen Master",
            Silver,
            Wellbeing,
            UnlockRule::When(Condition::stat_at_least("low_stress_streak", 5.0)),
        )
        .with_description("Keep stress low for five turns in a row."),
        AchievementDefinition::new(
            "fully_charged",
            "Fully Charged",
            Bronze,
            Wellbeing,
            UnlockRule::When(Condition::stat_at_least("high_energy_streak", 5.0)),
        )
        .with_description("Keep energy high for five turns in a row."),
        AchievementDefinition::new(
            "bounce_back",
            "Bounce Back",
            Silver,
            Wellbeing,
            UnlockRule::Check(|s| s.counters.stress_recovered),
        )
        .with_description("Recover from a stress peak.")
        .hidden(),
        AchievementDefinition::new(
            "in_the_red",
            "In the Red",
            Bronze,
            Finance,
            UnlockRule::Check(|s| s.stats.savings < 0.0),
        )
        .with_description("Run your savings below zero.")
        .hidden(),
        AchievementDefinition::new(
            "polymath",
            "Polymath",
            Gold,
            Skills,
            UnlockRule::When(Condition::all(vec![
                Condition::stat_at_least("coding", 50.0),
                Condition::stat_at_least("system_design", 50.0),
                Condition::stat_at_least("algorithms", 50.0),
                Condition::stat_at_least("debugging", 50.0),
            ])),
        )
        .with_description("Reach 50 in every technical skill."),
        AchievementDefinition::new(
            "trusted_mentor",
            "Trusted Mentor",
            Silver,
            Narrative,
            UnlockRule::Check(|s| s.narrative.flags.get("has_mentor").copied().unwrap_or(false)),
        )
        .with_description("Earn a mentor's trust."),
    ]
}
