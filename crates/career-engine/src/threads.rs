//! Narrative thread tracking.
//!
//! Threads are multi-chapter arcs layered on top of pool selection. The
//! primary active thread's next chapter takes priority over everything;
//! otherwise the first startable thread is offered; otherwise the caller
//! falls back to the pool.

use career_state::{
    GameState, NarrativeEffects, NarrativeThread, NpcInteraction, Stat,
};

use crate::condition::all_hold;
use crate::notification::Notification;

/// What the tracker wants presented next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadDecision<'a> {
    /// Next chapter of the primary active thread
    Continue {
        thread_id: &'a str,
        scenario_id: &'a str,
    },
    /// First chapter of a newly triggered thread
    Start {
        thread_id: &'a str,
        scenario_id: &'a str,
    },
    /// No thread wants the turn
    Pool,
}

/// Tracks thread progression against authored thread definitions.
#[derive(Debug, Clone, Default)]
pub struct ThreadTracker {
    threads: Vec<NarrativeThread>,
}

impl ThreadTracker {
    /// Creates a tracker over the given threads, in priority order.
    pub fn new(threads: Vec<NarrativeThread>) -> Self {
        Self { threads }
    }

    pub fn threads(&self) -> &[NarrativeThread] {
        &self.threads
    }

    /// Finds a thread by id.
    pub fn get(&self, thread_id: &str) -> Option<&NarrativeThread> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    /// Returns true if any thread presents the scenario as a chapter.
    pub fn is_thread_scenario(&self, scenario_id: &str) -> bool {
        self.threads.iter().any(|t| t.uses_scenario(scenario_id))
    }

    /// Decides whether a thread claims the next turn.
    pub fn decide(&self, state: &GameState) -> ThreadDecision<'_> {
        let narrative = &state.narrative;

        if let Some(thread) = narrative.primary_thread().and_then(|id| self.get(id)) {
            let index = narrative.chapter_index.get(&thread.id).copied().unwrap_or(0);
            if let Some(chapter) = thread.chapter(index) {
                if all_hold(&chapter.conditions, state, narrative) {
                    return ThreadDecision::Continue {
                        thread_id: &thread.id,
                        scenario_id: &chapter.scenario_id,
                    };
                }
                tracing::debug!(thread = %thread.id, chapter = index, "Chapter conditions not met");
            }
        }

        for thread in &self.threads {
            if narrative.is_active(&thread.id) || narrative.is_completed(&thread.id) {
                continue;
            }
            let Some(first) = thread.chapter(0) else {
                continue;
            };
            let triggered = thread
                .trigger_scenario
                .as_deref()
                .map_or(true, |s| state.has_completed(s, None));
            if triggered && all_hold(&thread.start_conditions, state, narrative) {
                return ThreadDecision::Start {
                    thread_id: &thread.id,
                    scenario_id: &first.scenario_id,
                };
            }
        }

        ThreadDecision::Pool
    }

    /// Activates a thread at its first chapter.
    pub fn begin(&self, state: &GameState, thread_id: &str) -> (GameState, Vec<Notification>) {
        let mut next = state.clone();
        if next.narrative.is_active(thread_id) || self.get(thread_id).is_none() {
            return (next, Vec::new());
        }

        next.narrative.activate(thread_id);
        tracing::info!(thread = %thread_id, turn = state.turn, "Thread started");
        (
            next,
            vec![Notification::ThreadStarted {
                thread_id: thread_id.to_string(),
            }],
        )
    }

    /// Records completion of `scenario_id` against every active thread whose
    /// current chapter presents it, then checks those threads' endings.
    pub fn complete_chapter(
        &self,
        state: &GameState,
        scenario_id: &str,
    ) -> (GameState, Vec<Notification>) {
        let mut next = state.clone();
        let mut notes = Vec::new();

        let active: Vec<String> = next.narrative.active_threads.clone();
        for thread_id in active {
            let Some(thread) = self.get(&thread_id) else {
                continue;
            };
            let index = next
                .narrative
                .chapter_index
                .get(&thread_id)
                .copied()
                .unwrap_or(0);
            let Some(chapter) = thread.chapter(index) else {
                continue;
            };
            if chapter.scenario_id != scenario_id {
                continue;
            }

            apply_effects(&mut next, &chapter.on_complete, scenario_id);
            next.narrative.chapter_index.insert(thread_id.clone(), index + 1);
            notes.push(Notification::ChapterCompleted {
                thread_id: thread_id.clone(),
                scenario_id: scenario_id.to_string(),
            });
            tracing::debug!(thread = %thread_id, chapter = index, "Chapter completed");

            let ending = thread
                .endings
                .iter()
                .find(|e| all_hold(&e.conditions, &next, &next.narrative));
            match ending {
                Some(ending) => {
                    apply_effects(&mut next, &ending.rewards, scenario_id);
                    self.conclude(&mut next, &thread_id, Some(ending.id.clone()), &mut notes);
                }
                None if index + 1 >= thread.chapters.len() => {
                    self.conclude(&mut next, &thread_id, None, &mut notes);
                }
                None => {}
            }
        }

        (next, notes)
    }

    fn conclude(
        &self,
        state: &mut GameState,
        thread_id: &str,
        ending: Option<String>,
        notes: &mut Vec<Notification>,
    ) {
        tracing::info!(thread = %thread_id, ending = ?ending, "Thread concluded");
        state.narrative.conclude(thread_id, ending.clone(), state.turn);
        notes.push(Notification::ThreadConcluded {
            thread_id: thread_id.to_string(),
            ending,
        });
    }
}

/// Applies chapter or ending effects in place.
fn apply_effects(state: &mut GameState, effects: &NarrativeEffects, scenario_id: &str) {
    if effects.is_empty() {
        return;
    }
    tracing::debug!(scenario = %scenario_id, "Applying narrative effects");
    for (name, value) in &effects.flags {
        state.flags.insert(name.clone(), *value);
    }
    for (name, value) in &effects.narrative_flags {
        state.narrative.flags.insert(name.clone(), *value);
    }

    let turn = state.turn;
    for effect in &effects.npc {
        let rel = state.narrative.npc_mut(&effect.npc);
        rel.adjust_trust(effect.trust);
        if let Some(attitude) = effect.attitude {
            rel.attitude = attitude;
        }
        rel.history.push(NpcInteraction {
            scenario_id: scenario_id.to_string(),
            trust_delta: effect.trust,
            turn,
        });
    }

    for (key, delta) in &effects.fx {
        match Stat::from_key(key) {
            Some(stat) => {
                state.stats.add(stat, *delta);
            }
            None => tracing::debug!(stat = %key, "Ignoring unknown stat in narrative effect"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_state::fixtures::{fresh_state, sample_content};
    use career_state::{Attitude, Chapter, FlagValue, HistoryEntry};

    fn tracker() -> ThreadTracker {
        ThreadTracker::new(sample_content().threads)
    }

    fn met_mentor(mut state: GameState) -> GameState {
        state
            .flags
            .insert("met_mentor".to_string(), FlagValue::Bool(true));
        state.history.push(HistoryEntry {
            scenario_id: "networking_meetup".to_string(),
            choice_id: "go".to_string(),
            turn: 1,
        });
        state.turn = 1;
        state
    }

    #[test]
    fn test_pool_when_nothing_triggered() {
        assert_eq!(tracker().decide(&fresh_state()), ThreadDecision::Pool);
    }

    #[test]
    fn test_start_requires_trigger_scenario_and_conditions() {
        let t = tracker();
        let mut s = fresh_state();
        s.flags
            .insert("met_mentor".to_string(), FlagValue::Bool(true));
        // Flag alone is not enough
        assert_eq!(t.decide(&s), ThreadDecision::Pool);

        let s = met_mentor(fresh_state());
        assert_eq!(
            t.decide(&s),
            ThreadDecision::Start {
                thread_id: "mentor_arc",
                scenario_id: "mentor_coffee"
            }
        );
    }

    #[test]
    fn test_begin_then_continue() {
        let t = tracker();
        let (s, notes) = t.begin(&met_mentor(fresh_state()), "mentor_arc");

        assert!(s.narrative.is_active("mentor_arc"));
        assert_eq!(
            notes,
            vec![Notification::ThreadStarted {
                thread_id: "mentor_arc".to_string()
            }]
        );
        assert_eq!(
            t.decide(&s),
            ThreadDecision::Continue {
                thread_id: "mentor_arc",
                scenario_id: "mentor_coffee"
            }
        );

        // Beginning twice is a no-op
        let (again, notes) = t.begin(&s, "mentor_arc");
        assert_eq!(again, s);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_chapter_effects_and_gating() {
        let t = tracker();
        let (s, _) = t.begin(&met_mentor(fresh_state()), "mentor_arc");

        let (s, notes) = t.complete_chapter(&s, "mentor_coffee");

        let sam = s.narrative.npc("mentor_sam").unwrap();
        assert_eq!(sam.trust, 20);
        assert_eq!(sam.attitude, Attitude::Friendly);
        assert_eq!(sam.history.len(), 1);
        assert_eq!(sam.history[0].scenario_id, "mentor_coffee");
        assert_eq!(notes.len(), 1);
        assert!(s.narrative.is_active("mentor_arc"));
        assert_eq!(
            t.decide(&s),
            ThreadDecision::Continue {
                thread_id: "mentor_arc",
                scenario_id: "mentor_mock_interview"
            }
        );

        // Chapter trigger conditions gate the continuation
        let mut cold = s.clone();
        cold.narrative.npc_mut("mentor_sam").trust = 0;
        assert_eq!(t.decide(&cold), ThreadDecision::Pool);
    }

    #[test]
    fn test_first_matching_ending_concludes() {
        let t = tracker();
        let (s, _) = t.begin(&met_mentor(fresh_state()), "mentor_arc");
        let (s, _) = t.complete_chapter(&s, "mentor_coffee");
        let confidence = s.stats.confidence;

        let (s, notes) = t.complete_chapter(&s, "mentor_mock_interview");

        assert!(!s.narrative.is_active("mentor_arc"));
        assert_eq!(
            s.narrative.completed_threads["mentor_arc"].ending.as_deref(),
            Some("trusted_mentor")
        );
        assert_eq!(s.narrative.npc("mentor_sam").unwrap().trust, 35);
        assert!(s.flag_is_set("mentor_prepared"));
        assert_eq!(s.narrative.flags.get("has_mentor"), Some(&true));
        assert_eq!(s.stats.confidence, confidence + 10.0);
        assert_eq!(
            notes.last(),
            Some(&Notification::ThreadConcluded {
                thread_id: "mentor_arc".to_string(),
                ending: Some("trusted_mentor".to_string())
            })
        );
        // Concluded threads never restart
        assert_eq!(t.decide(&s), ThreadDecision::Pool);
    }

    #[test]
    fn test_later_ending_when_first_fails() {
        let t = tracker();
        let (s, _) = t.begin(&met_mentor(fresh_state()), "mentor_arc");
        let (mut s, _) = t.complete_chapter(&s, "mentor_coffee");
        s.narrative.npc_mut("mentor_sam").trust = 10;

        let (s, _) = t.complete_chapter(&s, "mentor_mock_interview");

        assert_eq!(
            s.narrative.completed_threads["mentor_arc"].ending.as_deref(),
            Some("drifted_apart")
        );
        assert!(s.narrative.flags.get("has_mentor").is_none());
    }

    #[test]
    fn test_exhausted_thread_concludes_without_ending() {
        let t = ThreadTracker::new(vec![NarrativeThread {
            id: "side_gig".to_string(),
            title: "Side gig".to_string(),
            start_conditions: Vec::new(),
            trigger_scenario: None,
            chapters: vec![Chapter {
                scenario_id: "freelance".to_string(),
                conditions: Vec::new(),
                on_complete: NarrativeEffects::default(),
            }],
            endings: Vec::new(),
        }]);
        let (s, _) = t.begin(&fresh_state(), "side_gig");

        let (s, notes) = t.complete_chapter(&s, "freelance");

        assert_eq!(s.narrative.completed_threads["side_gig"].ending, None);
        assert_eq!(
            notes.last(),
            Some(&Notification::ThreadConcluded {
                thread_id: "side_gig".to_string(),
                ending: None
            })
        );
    }

    #[test]
    fn test_unrelated_scenario_is_noop() {
        let t = tracker();
        let (s, _) = t.begin(&met_mentor(fresh_state()), "mentor_arc");

        let (after, notes) = t.complete_chapter(&s, "leetcode_grind");

        assert_eq!(after, s);
        assert!(notes.is_empty());
    }
}
