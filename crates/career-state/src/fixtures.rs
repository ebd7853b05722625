//! Sample content fixtures.
//!
//! A small hand-authored pack used by tests and by the `career_sim` binary
//! when no content file is given. Enable the `sample-content` feature to
//! access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // career-state = { path = "../career-state", features = ["sample-content"] }
//!
//! use career_state::fixtures;
//!
//! let pack = fixtures::sample_content();
//! let state = fixtures::fresh_state();
//! ```

use crate::{ContentPack, GameState, STARTING_ROLE};

/// Raw JSON of the sample pack.
pub const SAMPLE_CONTENT_JSON: &str = include_str!("../tests/fixtures/sample_content.json");

/// Returns the sample content pack.
///
/// Contains:
/// - 11 hunt-phase scenarios across all three difficulty tiers
/// - 1 game-phase scenario locked to the `junior` role
/// - 1 two-chapter mentor thread with two endings
pub fn sample_content() -> ContentPack {
    ContentPack::from_json_str(SAMPLE_CONTENT_JSON)
        .unwrap_or_else(|e| panic!("Failed to parse sample_content.json: {}", e))
}

/// Returns a fresh hunt-phase state for a character named "Ada".
pub fn fresh_state() -> GameState {
    GameState::new("Ada", STARTING_ROLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_content_loads() {
        let pack = sample_content();
        assert_eq!(pack.scenarios.len(), 12);
        assert_eq!(pack.threads.len(), 1);
    }

    #[test]
    fn test_thread_chapters_reference_known_scenarios() {
        let pack = sample_content();
        for thread in &pack.threads {
            for chapter in &thread.chapters {
                assert!(
                    pack.scenario(&chapter.scenario_id).is_some(),
                    "chapter references unknown scenario {}",
                    chapter.scenario_id
                );
            }
        }
    }
}
