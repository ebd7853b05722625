//! Choice effect reducer.
//!
//! A pure transition `(state, choice) -> (state', notifications)`. The input
//! state is never touched; callers keep it around for comparison. Steps run
//! in a fixed order: stat deltas, skill bonus, energy cost, time cost,
//! directives, explicit stage, progress and momentum, behavioral counters,
//! then a throttled achievement check.

use rand::Rng;

use career_state::{Choice, EmotionalState, GameState, HistoryEntry, Stat};

use crate::achievements::AchievementEngine;
use crate::config::EngineConfig;
use crate::notification::Notification;
use crate::seed::{bonus_key, rng_from_key};

/// Result of applying a choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub notifications: Vec<Notification>,
}

/// Applies choices to state.
#[derive(Debug, Clone, Default)]
pub struct ChoiceReducer {
    config: EngineConfig,
}

impl ChoiceReducer {
    /// Creates a reducer with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Applies `choice`, made in `scenario_id`, to a copy of `state`.
    pub fn apply(
        &self,
        state: &GameState,
        scenario_id: &str,
        choice: &Choice,
        achievements: &AchievementEngine,
    ) -> Transition {
        let mut next = state.clone();
        let mut notes = Vec::new();

        self.apply_stat_deltas(&mut next, choice);
        self.apply_skill_bonus(state, &mut next, scenario_id, choice, &mut notes);
        self.apply_energy_cost(&mut next, choice);
        self.apply_time_cost(&mut next, choice, &mut notes);
        self.apply_directives(&mut next, choice, &mut notes);

        if let Some(stage) = choice.stage {
            next.stage = stage.min(self.config.progress.max_stage);
        }
        let momentum_activated = match choice.hunt_progress {
            Some(base) => self.apply_progress(&mut next, base, &mut notes),
            None => false,
        };
        if next.stage > state.stage {
            tracing::info!(from = state.stage, to = next.stage, "Stage advanced");
            notes.push(Notification::StageAdvanced {
                from: state.stage,
                to: next.stage,
            });
        }

        self.update_counters(&mut next, choice, momentum_activated, &mut notes);

        next.turn += 1;
        next.history.push(HistoryEntry {
            scenario_id: scenario_id.to_string(),
            choice_id: choice.id.clone(),
            turn: next.turn,
        });

        if self.should_check_achievements(state, &next) {
            for record in achievements.unlock_into(&mut next) {
                if let Some(note) = achievements.notification_for(&record) {
                    notes.push(note);
                }
            }
        }

        Transition {
            state: next,
            notifications: notes,
        }
    }

    fn apply_stat_deltas(&self, next: &mut GameState, choice: &Choice) {
        for (key, delta) in &choice.fx {
            match Stat::from_key(key) {
                Some(stat) => {
                    next.stats.add(stat, *delta);
                }
                None => tracing::debug!(stat = %key, choice = %choice.id, "Ignoring unknown stat"),
            }
        }
    }

    fn apply_skill_bonus(
        &self,
        before: &GameState,
        next: &mut GameState,
        scenario_id: &str,
        choice: &Choice,
        notes: &mut Vec<Notification>,
    ) {
        let Some(key) = choice.skill_bonus.as_deref() else {
            return;
        };
        let Some(stat) = Stat::from_key(key) else {
            tracing::debug!(stat = %key, choice = %choice.id, "Ignoring bonus for unknown stat");
            return;
        };

        let lo = self.config.reducer.skill_bonus_min;
        let hi = self.config.reducer.skill_bonus_max.max(lo);
        let mut rng = rng_from_key(&bonus_key(before, scenario_id, &choice.id));
        let amount: u32 = rng.gen_range(lo..=hi);

        next.stats.add(stat, f64::from(amount));
        notes.push(Notification::SkillBonus { stat, amount });
    }

    fn apply_energy_cost(&self, next: &mut GameState, choice: &Choice) {
        let scale = self.config.reducer.energy_cost_scale;
        if let Some(cost) = choice.energy_cost {
            if scale > 0.0 {
                next.stats.add(Stat::Energy, -(cost / scale));
            }
        }
    }

    fn apply_time_cost(&self, next: &mut GameState, choice: &Choice, notes: &mut Vec<Notification>) {
        let Some(months) = choice.time_cost else {
            return;
        };
        let months = months.max(0.0);
        next.months_elapsed += months;

        if next.is_employed() && self.config.reducer.months_per_year > 0.0 {
            let pay = next.stats.salary / self.config.reducer.months_per_year * months;
            next.stats.add(Stat::Savings, pay);
            notes.push(Notification::SalaryPaid { amount: pay });
        }

        let costs = next.stats.burn_rate * months;
        if costs > 0.0 {
            next.stats.add(Stat::Savings, -costs);
            notes.push(Notification::LivingCosts { amount: costs });
        }
    }

    fn apply_directives(&self, next: &mut GameState, choice: &Choice, notes: &mut Vec<Notification>) {
        if let Some(flag) = &choice.set_flag {
            next.flags.insert(flag.name.clone(), flag.value);
        }
        if let Some(role) = &choice.role {
            if *role != next.role {
                notes.push(Notification::RoleChanged {
                    from: std::mem::replace(&mut next.role, role.clone()),
                    to: role.clone(),
                });
            }
        }
        if let Some(phase) = choice.phase {
            if phase != next.phase {
                notes.push(Notification::PhaseChanged {
                    from: next.phase,
                    to: phase,
                });
                next.phase = phase;
            }
        }
    }

    /// Adds a progress contribution with momentum and rolls progress into
    /// stages. Returns true if momentum switched on this turn.
    ///
    /// The boost depends on momentum as it was at the start of the turn, so
    /// a streak that activates now only boosts the following turns.
    fn apply_progress(&self, next: &mut GameState, base: u32, notes: &mut Vec<Notification>) -> bool {
        let m = &self.config.momentum;
        let boosted = next.momentum.active;
        let contribution = if boosted {
            (f64::from(base) * m.boost).ceil().max(0.0) as u32
        } else {
            base
        };

        let mut activated = false;
        if base >= m.threshold {
            next.momentum.streak += 1;
            if !next.momentum.active && next.momentum.streak >= m.streak_to_activate {
                next.momentum.active = true;
                next.momentum.triggers += 1;
                activated = true;
                notes.push(Notification::MomentumActivated {
                    streak: next.momentum.streak,
                });
            }
        } else {
            next.momentum.streak = 0;
            if next.momentum.active {
                next.momentum.active = false;
                notes.push(Notification::MomentumLost);
            }
        }

        tracing::debug!(base, contribution, boosted, streak = next.momentum.streak, "Progress");

        let per_stage = self.config.progress.per_stage.max(1);
        let max_stage = self.config.progress.max_stage;
        next.progress = next.progress.saturating_add(contribution);
        while next.progress >= per_stage && next.stage < max_stage {
            next.progress -= per_stage;
            next.stage += 1;
        }
        if next.stage >= max_stage {
            next.progress = next.progress.min(per_stage);
        }

        activated
    }

    fn update_counters(
        &self,
        next: &mut GameState,
        choice: &Choice,
        momentum_activated: bool,
        notes: &mut Vec<Notification>,
    ) {
        let c = &self.config.counters;
        let stress = next.stats.stress;
        let energy = next.stats.energy;

        if stress < c.low_stress {
            next.counters.low_stress_streak += 1;
        } else {
            next.counters.low_stress_streak = 0;
        }
        if energy >= c.high_energy {
            next.counters.high_energy_streak += 1;
        } else {
            next.counters.high_energy_streak = 0;
        }
        if stress >= c.stress_peak {
            next.counters.stress_peaked = true;
        } else if next.counters.stress_peaked && stress < c.stress_recovery {
            next.counters.stress_peaked = false;
            next.counters.stress_recovered = true;
            notes.push(Notification::StressRecovered);
        }

        next.emotional_state = match choice.emotion {
            Some(explicit) => explicit,
            None if stress >= c.stress_peak => EmotionalState::Stressed,
            None if energy < c.exhausted_energy => EmotionalState::Exhausted,
            None if momentum_activated => EmotionalState::Motivated,
            None => match next.emotional_state {
                EmotionalState::Stressed | EmotionalState::Exhausted => EmotionalState::Calm,
                other => other,
            },
        };
    }

    /// The achievement pass is throttled to turns where something notable
    /// happened, or every N turns.
    fn should_check_achievements(&self, before: &GameState, after: &GameState) -> bool {
        let cfg = &self.config.achievements;
        let milestone = u64::from(cfg.progress_milestone.max(1));

        after.stage != before.stage
            || before.pipeline_position() / milestone != after.pipeline_position() / milestone
            || before.stats.max_swing(&after.stats) >= cfg.stat_swing
            || (cfg.every_turns > 0 && after.turn % cfg.every_turns == 0)
    }
}
