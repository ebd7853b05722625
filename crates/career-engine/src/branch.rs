//! Render-time branch resolution.

use serde::Serialize;

use career_state::{Choice, GameState, NarrativeContext, Scenario};

use crate::condition::all_hold;

/// Display content of a scenario after branch substitution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveScenario<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub text: &'a str,
    pub choices: &'a [Choice],
    /// Index of the applied branch; `None` for base content
    pub branch_index: Option<usize>,
}

impl<'a> EffectiveScenario<'a> {
    /// Finds a displayed choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&'a Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// Resolves the first branch whose conditions all hold, substituting its
/// fields over the base content. Fields a branch leaves out keep the base
/// values.
pub fn resolve<'a>(
    scenario: &'a Scenario,
    state: &GameState,
    narrative: &NarrativeContext,
) -> EffectiveScenario<'a> {
    let base = EffectiveScenario {
        id: &scenario.id,
        title: &scenario.title,
        text: &scenario.text,
        choices: &scenario.choices,
        branch_index: None,
    };

    let Some((index, branch)) = scenario
        .branches
        .iter()
        .enumerate()
        .find(|(_, b)| all_hold(&b.conditions, state, narrative))
    else {
        return base;
    };

    EffectiveScenario {
        title: branch.title.as_deref().unwrap_or(base.title),
        text: branch.text.as_deref().unwrap_or(base.text),
        choices: branch.choices.as_deref().unwrap_or(base.choices),
        branch_index: Some(index),
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_state::{Branch, Condition, FlagValue, STARTING_ROLE};

    fn scenario() -> Scenario {
        let mut s = Scenario::new("phone_screen", "Phone screen")
            .with_choice(Choice::new("prepare", "Prepare"))
            .with_branch(Branch {
                conditions: vec![Condition::flag("talked_to_recruiter")],
                title: Some("A warm intro".to_string()),
                text: None,
                choices: Some(vec![Choice::new("reference", "Mention the recruiter")]),
            })
            .with_branch(Branch {
                conditions: vec![Condition::stat_at_least("coding", 0.0)],
                title: Some("A cold call".to_string()),
                text: Some("They found you on a job board.".to_string()),
                choices: None,
            });
        s.text = "A hiring manager wants to talk.".to_string();
        s
    }

    fn state() -> GameState {
        GameState::new("Ada", STARTING_ROLE)
    }

    #[test]
    fn test_first_matching_branch_wins() {
        let scenario = scenario();
        let mut s = state();
        s.flags
            .insert("talked_to_recruiter".to_string(), FlagValue::Bool(true));

        let view = resolve(&scenario, &s, &s.narrative);

        // Both branches match; the first in authored order applies
        assert_eq!(view.branch_index, Some(0));
        assert_eq!(view.title, "A warm intro");
        // Absent text falls back to base
        assert_eq!(view.text, "A hiring manager wants to talk.");
        assert_eq!(view.choices[0].id, "reference");
        assert!(view.choice("prepare").is_none());
    }

    #[test]
    fn test_later_branch_when_first_fails() {
        let scenario = scenario();
        let s = state();

        let view = resolve(&scenario, &s, &s.narrative);

        assert_eq!(view.branch_index, Some(1));
        assert_eq!(view.title, "A cold call");
        assert_eq!(view.choices, scenario.choices.as_slice());
    }

    #[test]
    fn test_no_match_returns_base() {
        let mut scenario = scenario();
        scenario.branches[1].conditions = vec![Condition::flag("never")];
        let s = state();

        let view = resolve(&scenario, &s, &s.narrative);

        assert_eq!(view.branch_index, None);
        assert_eq!(view.id, "phone_screen");
        assert_eq!(view.title, "Phone screen");
        assert_eq!(view.choices, scenario.choices.as_slice());
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let scenario = scenario();
        let s = state();

        let first = resolve(&scenario, &s, &s.narrative);
        let second = resolve(&scenario, &s, &s.narrative);

        assert_eq!(first, second);
    }
}
