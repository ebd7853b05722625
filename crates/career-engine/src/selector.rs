//! Weighted scenario selection.
//!
//! Filters the pool, weights the survivors by difficulty fit and tag
//! fatigue, then draws with a generator reseeded from the state. Nothing here
//! touches the state directly; bookkeeping comes back as [`SelectionUpdates`].

use rand::Rng;
use std::collections::BTreeMap;

use career_state::{Choice, Difficulty, GameState, RecentWindow, Scenario};

use crate::config::SelectorConfig;
use crate::seed::{rng_from_key, selection_key};

/// Id of the built-in filler scenario.
pub const FALLBACK_SCENARIO_ID: &str = "quiet_week";

/// State bookkeeping produced by one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionUpdates {
    pub cooldowns: BTreeMap<String, u32>,
    pub recent_scenarios: RecentWindow,
    pub recent_tags: RecentWindow,
}

impl SelectionUpdates {
    /// Writes the updates into a state.
    pub fn apply(self, state: &mut GameState) {
        state.cooldowns = self.cooldowns;
        state.recent_scenarios = self.recent_scenarios;
        state.recent_tags = self.recent_tags;
    }
}

/// Outcome of [`ScenarioSelector::pick_next`].
///
/// `scenario` is `None` when nothing is available this turn, including the
/// filler. The updates must still be applied so cooldowns keep ticking.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub scenario: Option<&'a Scenario>,
    pub updates: SelectionUpdates,
}

impl Selection<'_> {
    /// Id of the picked scenario, if any.
    pub fn scenario_id(&self) -> Option<&str> {
        self.scenario.map(|s| s.id.as_str())
    }
}

/// Difficulty band derived from the pipeline stage.
fn band_for_stage(config: &SelectorConfig, stage: u32) -> Difficulty {
    if stage < config.intermediate_from_stage {
        Difficulty::Beginner
    } else if stage < config.advanced_from_stage {
        Difficulty::Intermediate
    } else {
        Difficulty::Advanced
    }
}

/// Picks the next scenario from a pool.
#[derive(Debug, Clone)]
pub struct ScenarioSelector {
    config: SelectorConfig,
    fallback: Scenario,
}

impl Default for ScenarioSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

impl ScenarioSelector {
    /// Creates a selector with the built-in filler scenario.
    pub fn new(config: SelectorConfig) -> Self {
        let fallback = fallback_scenario(config.fallback_cooldown);
        Self { config, fallback }
    }

    /// The filler scenario served when nothing else is eligible.
    pub fn fallback(&self) -> &Scenario {
        &self.fallback
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Selects the next scenario for `role`.
    pub fn pick_next<'a>(
        &'a self,
        pool: &'a [Scenario],
        state: &GameState,
        role: &str,
    ) -> Selection<'a> {
        let mut cooldowns = state.cooldowns.clone();
        cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });

        let weighted: Vec<(&Scenario, u32)> = pool
            .iter()
            .filter(|s| self.is_eligible(s, state, role, &cooldowns))
            .map(|s| (s, self.weight(s, state)))
            .filter(|(_, w)| *w > 0)
            .collect();

        tracing::debug!(
            pool = pool.len(),
            candidates = weighted.len(),
            stage = state.stage,
            "Selecting scenario"
        );

        let picked = if weighted.is_empty() {
            if cooldowns.contains_key(&self.fallback.id) {
                tracing::debug!("Fallback cooling down; no scenario this turn");
                None
            } else {
                Some(&self.fallback)
            }
        } else {
            Some(draw(&weighted, &selection_key(state, role)))
        };

        let mut recent_scenarios = state.recent_scenarios.clone();
        let mut recent_tags = state.recent_tags.clone();
        if let Some(scenario) = picked {
            recent_scenarios.push(scenario.id.clone());
            for tag in &scenario.tags {
                recent_tags.push(tag.clone());
            }
            let cooldown = scenario.cooldown.unwrap_or(self.config.default_cooldown);
            if cooldown > 0 {
                cooldowns.insert(scenario.id.clone(), cooldown);
            }
        }

        Selection {
            scenario: picked,
            updates: SelectionUpdates {
                cooldowns,
                recent_scenarios,
                recent_tags,
            },
        }
    }

    fn is_eligible(
        &self,
        scenario: &Scenario,
        state: &GameState,
        role: &str,
        cooldowns: &BTreeMap<String, u32>,
    ) -> bool {
        scenario.phase == state.phase
            && scenario.allows_role(role)
            && scenario.gate.admits(state.stage)
            && !state.recent_scenarios.contains(&scenario.id)
            && !cooldowns.contains_key(&scenario.id)
            && scenario
                .requires
                .iter()
                .all(|(key, min)| state.metric(key).is_some_and(|v| v >= *min))
    }

    /// Integer draw weight of an eligible scenario; zero means unreachable.
    pub fn weight(&self, scenario: &Scenario, state: &GameState) -> u32 {
        let c = &self.config;
        let band = band_for_stage(c, state.stage);

        let weight = match scenario.difficulty {
            Some(d) if d == band => c.base_weight + c.band_match_bonus,
            Some(Difficulty::Advanced) if band == Difficulty::Beginner => 0,
            Some(Difficulty::Beginner) if band == Difficulty::Advanced => c.late_easy_weight,
            _ => c.base_weight,
        };

        let overlap = scenario
            .tags
            .iter()
            .filter(|t| state.recent_tags.contains(t))
            .count() as u32;

        // Fatigue never takes reachable content to zero
        match weight {
            0 => 0,
            w => (w / (overlap + 1)).max(1),
        }
    }
}

/// Cumulative-weight draw. `weighted` must be non-empty with positive weights.
fn draw<'a>(weighted: &[(&'a Scenario, u32)], key: &str) -> &'a Scenario {
    let total: u64 = weighted.iter().map(|(_, w)| u64::from(*w)).sum();
    let mut rng = rng_from_key(key);
    let mut roll = rng.gen_range(0..total);

    for (scenario, weight) in weighted {
        let weight = u64::from(*weight);
        if roll < weight {
            return scenario;
        }
        roll -= weight;
    }
    weighted[weighted.len() - 1].0
}

/// The filler scenario: always eligible, costs a little time, restores a
/// little energy.
fn fallback_scenario(cooldown: u32) -> Scenario {
    let mut scenario = Scenario::new(FALLBACK_SCENARIO_ID, "A quiet week");
    scenario.text = "Nothing much happens. You catch up on sleep and email.".to_string();
    scenario.cooldown = Some(cooldown);
    scenario.with_choice(
        Choice::new("rest", "Take it easy")
            .with_fx("energy", 0.1)
            .with_fx("stress", -0.05)
            .with_time_cost(0.25),
    )
}
