//! Career decision engine.
//!
//! The engine sits between authored content and the presentation layer. Each
//! turn it picks a scenario (narrative threads first, then a weighted draw
//! from the pool), renders its branch-resolved content, and applies the
//! player's choice through a pure reducer. State goes in by reference and a
//! new state comes back; nothing here does I/O or keeps per-session state.
//!
//! # Turn flow
//!
//! ```text
//! next_scenario(state) ──▶ ThreadTracker::decide ──▶ Continue/Start ─┐
//!                                   │                                 ├─▶ branch::resolve
//!                                   └─▶ Pool ─▶ ScenarioSelector ─────┘
//!
//! submit_turn(state, scenario, choice) ──▶ ChoiceReducer::apply
//!                                        ──▶ ThreadTracker::complete_chapter
//! ```
//!
//! # Modules
//!
//! - [`condition`]: Total evaluator for condition trees
//! - [`reducer`]: Choice effect reducer (stats, costs, momentum, rollover)
//! - [`selector`]: Weighted scenario selection with deterministic seeding
//! - [`branch`]: Render-time branch resolution
//! - [`achievements`]: Achievement registry and unlock checks
//! - [`threads`]: Narrative thread tracking
//! - [`config`]: TOML-overridable tuning constants

pub mod achievements;
pub mod branch;
pub mod condition;
pub mod config;
pub mod notification;
pub mod reducer;
pub mod seed;
pub mod selector;
pub mod threads;

pub use achievements::{
    default_catalog, AchievementDefinition, AchievementEngine, Category, Tier, UnlockRule,
};
pub use branch::{resolve, EffectiveScenario};
pub use condition::{all_hold, evaluate, holds};
pub use config::{
    default_config_toml, AchievementCheckConfig, ConfigError, CounterConfig, EngineConfig,
    MomentumConfig, ProgressConfig, ReducerConfig, SelectorConfig,
};
pub use notification::Notification;
pub use reducer::{ChoiceReducer, Transition};
pub use selector::{ScenarioSelector, Selection, SelectionUpdates, FALLBACK_SCENARIO_ID};
pub use threads::{ThreadDecision, ThreadTracker};

use serde::Serialize;
use thiserror::Error;

use career_state::{ContentPack, GameState, RecentWindow, Scenario};

/// Errors raised by [`Engine::submit_turn`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("scenario '{scenario}' offers no choice '{choice}'")]
    UnknownChoice { scenario: String, choice: String },
}

/// Where the presented scenario came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioSource {
    /// Chapter of a narrative thread
    Thread { thread_id: String },
    /// Weighted pool draw
    Pool,
    /// Built-in filler
    Fallback,
    /// Nothing available this turn
    Idle,
}

/// Result of [`Engine::next_scenario`].
#[derive(Debug, Clone)]
pub struct NextScenario<'a> {
    /// Branch-resolved content; `None` means show an idle state
    pub scenario: Option<EffectiveScenario<'a>>,
    pub source: ScenarioSource,
    /// State with selection bookkeeping applied
    pub state: GameState,
    pub notifications: Vec<Notification>,
}

/// Result of [`Engine::submit_turn`].
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub state: GameState,
    pub notifications: Vec<Notification>,
}

/// The decision engine for one content pack.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    content: ContentPack,
    /// Scenarios eligible for pool draws; thread chapters are excluded
    pool: Vec<Scenario>,
    threads: ThreadTracker,
    selector: ScenarioSelector,
    reducer: ChoiceReducer,
    achievements: AchievementEngine,
}

impl Engine {
    /// Creates an engine with the built-in achievement catalog.
    pub fn new(config: EngineConfig, content: ContentPack) -> Self {
        let threads = ThreadTracker::new(content.threads.clone());
        let pool = content
            .scenarios
            .iter()
            .filter(|s| !threads.is_thread_scenario(&s.id))
            .cloned()
            .collect::<Vec<_>>();

        tracing::info!(
            scenarios = content.scenarios.len(),
            pool = pool.len(),
            threads = content.threads.len(),
            "Engine loaded"
        );

        Self {
            selector: ScenarioSelector::new(config.selector.clone()),
            reducer: ChoiceReducer::new(config.clone()),
            achievements: AchievementEngine::with_default_catalog(),
            config,
            content,
            pool,
            threads,
        }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults(content: ContentPack) -> Self {
        Self::new(EngineConfig::default(), content)
    }

    /// Replaces the achievement registry.
    pub fn with_achievements(mut self, achievements: AchievementEngine) -> Self {
        self.achievements = achievements;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn threads(&self) -> &ThreadTracker {
        &self.threads
    }

    pub fn selector(&self) -> &ScenarioSelector {
        &self.selector
    }

    /// Scenarios available to pool draws.
    pub fn pool(&self) -> &[Scenario] {
        &self.pool
    }

    /// Looks up any scenario the engine can present, including the filler.
    pub fn scenario(&self, scenario_id: &str) -> Option<&Scenario> {
        self.content.scenario(scenario_id).or_else(|| {
            let fallback = self.selector.fallback();
            (fallback.id == scenario_id).then_some(fallback)
        })
    }

    /// Starts a session with windows sized from configuration.
    pub fn new_game(&self, character_name: &str, role: &str) -> GameState {
        let mut state = GameState::new(character_name, role);
        state.recent_scenarios = RecentWindow::new(self.config.selector.recent_scenarios);
        state.recent_tags = RecentWindow::new(self.config.selector.recent_tags);
        state
    }

    /// Picks and renders the next scenario.
    pub fn next_scenario(&self, state: &GameState) -> NextScenario<'_> {
        match self.threads.decide(state) {
            ThreadDecision::Continue {
                thread_id,
                scenario_id,
            } => {
                if let Some(scenario) = self.content.scenario(scenario_id) {
                    return NextScenario {
                        scenario: Some(resolve(scenario, state, &state.narrative)),
                        source: ScenarioSource::Thread {
                            thread_id: thread_id.to_string(),
                        },
                        state: state.clone(),
                        notifications: Vec::new(),
                    };
                }
                tracing::warn!(thread = %thread_id, scenario = %scenario_id, "Chapter scenario missing");
            }
            ThreadDecision::Start {
                thread_id,
                scenario_id,
            } => {
                if let Some(scenario) = self.content.scenario(scenario_id) {
                    let (next, notifications) = self.threads.begin(state, thread_id);
                    return NextScenario {
                        scenario: Some(resolve(scenario, &next, &next.narrative)),
                        source: ScenarioSource::Thread {
                            thread_id: thread_id.to_string(),
                        },
                        state: next,
                        notifications,
                    };
                }
                tracing::warn!(thread = %thread_id, scenario = %scenario_id, "Chapter scenario missing");
            }
            ThreadDecision::Pool => {}
        }

        let selection = self.selector.pick_next(&self.pool, state, &state.role);
        let picked = selection.scenario;
        let mut next = state.clone();
        selection.updates.apply(&mut next);

        let source = match picked {
            None => ScenarioSource::Idle,
            Some(s) if s.id == FALLBACK_SCENARIO_ID => ScenarioSource::Fallback,
            Some(_) => ScenarioSource::Pool,
        };

        NextScenario {
            scenario: picked.map(|s| resolve(s, &next, &next.narrative)),
            source,
            state: next,
            notifications: Vec::new(),
        }
    }

    /// Applies the player's choice for a presented scenario.
    ///
    /// The choice is looked up in the branch-resolved content, so a branch
    /// that replaces the choice list also replaces what can be submitted.
    pub fn submit_turn(
        &self,
        state: &GameState,
        scenario_id: &str,
        choice_id: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let scenario = self
            .scenario(scenario_id)
            .ok_or_else(|| EngineError::UnknownScenario(scenario_id.to_string()))?;
        let view = resolve(scenario, state, &state.narrative);
        let choice = view.choice(choice_id).ok_or_else(|| EngineError::UnknownChoice {
            scenario: scenario_id.to_string(),
            choice: choice_id.to_string(),
        })?;

        let transition = self
            .reducer
            .apply(state, scenario_id, choice, &self.achievements);
        let mut notifications = transition.notifications;

        let (mut next, thread_notes) = self.threads.complete_chapter(&transition.state, scenario_id);
        if !thread_notes.is_empty() {
            notifications.extend(thread_notes);
            // Endings can grant rewards that unlock achievements
            for record in self.achievements.unlock_into(&mut next) {
                notifications.extend(self.achievements.notification_for(&record));
            }
        }

        tracing::debug!(
            turn = next.turn,
            scenario = %scenario_id,
            choice = %choice_id,
            stage = next.stage,
            progress = next.progress,
            "Turn applied"
        );

        Ok(TurnOutcome {
            state: next,
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_state::fixtures::sample_content;
    use career_state::STARTING_ROLE;

    fn engine() -> Engine {
        Engine::with_defaults(sample_content())
    }

    #[test]
    fn test_thread_scenarios_excluded_from_pool() {
        let e = engine();
        assert_eq!(e.pool().len(), 10);
        assert!(e.pool().iter().all(|s| !s.id.starts_with("mentor_")));
        assert!(e.scenario("mentor_coffee").is_some());
        assert!(e.scenario(FALLBACK_SCENARIO_ID).is_some());
    }

    #[test]
    fn test_new_game_windows_follow_config() {
        let mut config = EngineConfig::default();
        config.selector.recent_scenarios = 2;
        let e = Engine::new(config, sample_content());

        let state = e.new_game("Ada", STARTING_ROLE);

        assert_eq!(state.recent_scenarios.capacity(), 2);
        assert_eq!(state.recent_tags.capacity(), 3);
    }

    #[test]
    fn test_next_scenario_from_pool() {
        let e = engine();
        let state = e.new_game("Ada", STARTING_ROLE);

        let next = e.next_scenario(&state);

        assert_eq!(next.source, ScenarioSource::Pool);
        let view = next.scenario.unwrap();
        assert!(next.state.recent_scenarios.contains(view.id));
        assert!(next.state.cooldowns.get(view.id).is_some_and(|&t| t > 0));
        // Input untouched
        assert!(state.recent_scenarios.is_empty());
    }

    #[test]
    fn test_submit_unknown_scenario_and_choice() {
        let e = engine();
        let state = e.new_game("Ada", STARTING_ROLE);

        assert_eq!(
            e.submit_turn(&state, "nope", "x"),
            Err(EngineError::UnknownScenario("nope".to_string()))
        );
        assert_eq!(
            e.submit_turn(&state, "resume_polish", "burn_it"),
            Err(EngineError::UnknownChoice {
                scenario: "resume_polish".to_string(),
                choice: "burn_it".to_string()
            })
        );
    }

    #[test]
    fn test_submit_fallback_choice() {
        let e = engine();
        let state = e.new_game("Ada", STARTING_ROLE);

        let outcome = e.submit_turn(&state, FALLBACK_SCENARIO_ID, "rest").unwrap();

        assert_eq!(outcome.state.turn, 1);
        assert_eq!(outcome.state.months_elapsed, 0.25);
    }

    #[test]
    fn test_branch_choices_are_submittable() {
        let e = engine();
        let mut state = e.new_game("Ada", STARTING_ROLE);
        state.stage = 1;

        let outcome = e.submit_turn(&state, "phone_screen", "prepare").unwrap();

        assert!(outcome.state.has_completed("phone_screen", Some("prepare")));
    }

    #[test]
    fn test_thread_started_after_trigger() {
        let e = engine();
        let state = e.new_game("Ada", STARTING_ROLE);

        let outcome = e.submit_turn(&state, "networking_meetup", "go").unwrap();
        let next = e.next_scenario(&outcome.state);

        assert_eq!(
            next.source,
            ScenarioSource::Thread {
                thread_id: "mentor_arc".to_string()
            }
        );
        assert_eq!(next.scenario.unwrap().id, "mentor_coffee");
        assert!(next.state.narrative.is_active("mentor_arc"));
        assert_eq!(
            next.notifications,
            vec![Notification::ThreadStarted {
                thread_id: "mentor_arc".to_string()
            }]
        );
    }

    #[test]
    fn test_thread_ending_unlocks_achievement() {
        let e = engine();
        let state = e.new_game("Ada", STARTING_ROLE);
        let state = e.submit_turn(&state, "networking_meetup", "go").unwrap().state;
        let state = e.next_scenario(&state).state;
        let state = e.submit_turn(&state, "mentor_coffee", "listen").unwrap().state;

        let outcome = e
            .submit_turn(&state, "mentor_mock_interview", "accept_feedback")
            .unwrap();

        assert!(outcome.state.has_achievement("trusted_mentor"));
        assert!(outcome.notifications.iter().any(|n| matches!(
            n,
            Notification::ThreadConcluded { ending: Some(id), .. } if id == "trusted_mentor"
        )));
    }
}
