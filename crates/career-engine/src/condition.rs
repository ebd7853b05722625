//! Condition evaluation.
//!
//! Total and side-effect free: every unresolvable reference (unknown stat,
//! missing flag, unknown NPC) evaluates to `false` instead of failing.

use career_state::{Condition, GameState, NarrativeContext};

/// Tolerance for `stat_equal` comparisons.
const EQUALITY_EPSILON: f64 = 1e-9;

/// Evaluates a condition against state and narrative context.
pub fn evaluate(condition: &Condition, state: &GameState, narrative: &NarrativeContext) -> bool {
    match condition {
        Condition::Stat { stat, min, max } => match state.metric(stat) {
            Some(value) => {
                min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
            }
            None => false,
        },
        Condition::StatEqual { stat, value } => state
            .metric(stat)
            .is_some_and(|v| (v - value).abs() < EQUALITY_EPSILON),
        Condition::Flag { flag, value } => state.flag_is_set(flag) == *value,
        Condition::Emotional { state: wanted } => state.emotional_state == *wanted,
        Condition::NpcRelation {
            npc,
            min_trust,
            attitude,
        } => match narrative.npc(npc) {
            Some(rel) => {
                min_trust.map_or(true, |t| rel.trust >= t)
                    && attitude.map_or(true, |a| rel.attitude == a)
            }
            None => false,
        },
        Condition::EventHistory { scenario, choice } => {
            state.has_completed(scenario, choice.as_deref())
        }
        Condition::ThreadActive { thread } => narrative.is_active(thread),
        Condition::And { conditions } => all_hold(conditions, state, narrative),
        Condition::Or { conditions } => conditions.iter().any(|c| evaluate(c, state, narrative)),
        Condition::Not { condition } => !evaluate(condition, state, narrative),
    }
}

/// Returns true if every condition holds; an empty slice holds.
pub fn all_hold(conditions: &[Condition], state: &GameState, narrative: &NarrativeContext) -> bool {
    conditions.iter().all(|c| evaluate(c, state, narrative))
}

/// Evaluates against the state's own narrative context.
pub fn holds(condition: &Condition, state: &GameState) -> bool {
    evaluate(condition, state, &state.narrative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_state::{Attitude, EmotionalState, FlagValue, HistoryEntry, STARTING_ROLE};

    fn state() -> GameState {
        let mut state = GameState::new("Ada", STARTING_ROLE);
        state.stats.coding = 40.0;
        state.flags.insert("met_cto".to_string(), FlagValue::Bool(true));
        state.history.push(HistoryEntry {
            scenario_id: "phone_screen".to_string(),
            choice_id: "prepare".to_string(),
            turn: 1,
        });
        let rel = state.narrative.npc_mut("recruiter_ana");
        rel.trust = 25;
        rel.attitude = Attitude::Friendly;
        state.narrative.activate("mentor_arc");
        state
    }

    #[test]
    fn test_stat_bounds_inclusive() {
        let s = state();
        let check = |min, max| {
            holds(
                &Condition::Stat {
                    stat: "coding".to_string(),
                    min,
                    max,
                },
                &s,
            )
        };

        assert!(check(Some(40.0), None));
        assert!(check(None, Some(40.0)));
        assert!(check(Some(40.0), Some(40.0)));
        assert!(!check(Some(40.1), None));
        assert!(!check(None, Some(39.9)));
        assert!(check(None, None));
    }

    #[test]
    fn test_stat_equal() {
        let s = state();
        assert!(holds(
            &Condition::StatEqual {
                stat: "coding".to_string(),
                value: 40.0
            },
            &s
        ));
        assert!(!holds(
            &Condition::StatEqual {
                stat: "coding".to_string(),
                value: 41.0
            },
            &s
        ));
    }

    #[test]
    fn test_flags() {
        let s = state();
        assert!(holds(&Condition::flag("met_cto"), &s));
        assert!(!holds(&Condition::flag("missing"), &s));
        // Missing flag reads as false, so equality with false holds
        assert!(holds(
            &Condition::Flag {
                flag: "missing".to_string(),
                value: false
            },
            &s
        ));
    }

    #[test]
    fn test_emotional() {
        let mut s = state();
        s.emotional_state = EmotionalState::Anxious;
        assert!(holds(
            &Condition::Emotional {
                state: EmotionalState::Anxious
            },
            &s
        ));
        assert!(!holds(
            &Condition::Emotional {
                state: EmotionalState::Calm
            },
            &s
        ));
    }

    #[test]
    fn test_npc_relation() {
        let s = state();
        let rel = |min_trust, attitude| {
            holds(
                &Condition::NpcRelation {
                    npc: "recruiter_ana".to_string(),
                    min_trust,
                    attitude,
                },
                &s,
            )
        };

        assert!(rel(Some(25), None));
        assert!(!rel(Some(26), None));
        assert!(rel(None, Some(Attitude::Friendly)));
        assert!(!rel(Some(10), Some(Attitude::Hostile)));
    }

    #[test]
    fn test_history_and_threads() {
        let s = state();
        assert!(holds(&Condition::completed("phone_screen"), &s));
        assert!(!holds(
            &Condition::EventHistory {
                scenario: "phone_screen".to_string(),
                choice: Some("wing_it".to_string())
            },
            &s
        ));
        assert!(holds(
            &Condition::ThreadActive {
                thread: "mentor_arc".to_string()
            },
            &s
        ));
    }

    #[test]
    fn test_combinators() {
        let s = state();
        assert!(holds(&Condition::all(vec![]), &s));
        assert!(!holds(&Condition::any(vec![]), &s));
        assert!(holds(
            &Condition::any(vec![Condition::flag("missing"), Condition::flag("met_cto")]),
            &s
        ));
        assert!(!holds(
            &Condition::all(vec![Condition::flag("missing"), Condition::flag("met_cto")]),
            &s
        ));
        assert!(holds(&Condition::negate(Condition::flag("missing")), &s));
    }

    #[test]
    fn test_deep_nesting() {
        let s = state();
        let mut cond = Condition::flag("met_cto");
        for _ in 0..200 {
            cond = Condition::negate(Condition::negate(cond));
        }
        assert!(holds(&cond, &s));
    }

    #[test]
    fn test_unresolvable_references_are_false() {
        let s = state();
        let cases = vec![
            Condition::stat_at_least("charisma", 0.0),
            Condition::stat_at_most("charisma", 100.0),
            Condition::StatEqual {
                stat: "charisma".to_string(),
                value: 0.0,
            },
            Condition::flag("never_set"),
            Condition::NpcRelation {
                npc: "ghost".to_string(),
                min_trust: None,
                attitude: None,
            },
            Condition::completed("never_played"),
            Condition::ThreadActive {
                thread: "no_such_thread".to_string(),
            },
        ];

        for cond in cases {
            assert!(!holds(&cond, &s), "{:?} should be false", cond);
        }
    }

    #[test]
    fn test_explicit_context_is_used() {
        let s = state();
        let empty = NarrativeContext::default();
        let cond = Condition::ThreadActive {
            thread: "mentor_arc".to_string(),
        };

        assert!(evaluate(&cond, &s, &s.narrative));
        assert!(!evaluate(&cond, &s, &empty));
    }
}
