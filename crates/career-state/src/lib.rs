//! Shared state and content types for the career decision engine.
//!
//! This crate contains pure data structures with no engine logic beyond
//! range clamping and lookups. It is a dependency for all other crates in
//! the workspace.

pub mod condition;
pub mod content;
pub mod game_state;
pub mod narrative;
pub mod scenario;
pub mod stats;

#[cfg(feature = "sample-content")]
pub mod fixtures;

pub use condition::Condition;
pub use content::{ContentError, ContentPack};
pub use game_state::{
    AchievementRecord, BehaviorCounters, FlagValue, GameState, HistoryEntry, Momentum,
    RecentWindow, DEFAULT_RECENT_SCENARIOS, DEFAULT_RECENT_TAGS, STARTING_ROLE,
};
pub use narrative::{
    Attitude, Chapter, CompletedThread, Ending, NarrativeContext, NarrativeEffects,
    NarrativeThread, NpcEffect, NpcInteraction, NpcRelationship, TRUST_MAX, TRUST_MIN,
};
pub use scenario::{Branch, Choice, Difficulty, FlagSet, Phase, Scenario, StageGate};
pub use stats::{EmotionalState, Stat, StatGroup, StatRange, StateVector, BEHAVIORAL_MAX};
