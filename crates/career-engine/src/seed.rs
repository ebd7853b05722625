//! Deterministic seeding.
//!
//! Draws are reseeded from state on every call instead of coming from a
//! long-lived stream. A stable string key is hashed with 32-bit FNV-1a and
//! the hash seeds a `ChaCha8Rng`, whose output stream is fixed by its
//! reference algorithm, so identical keys give identical draws on every
//! platform.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use career_state::GameState;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the UTF-8 bytes of `key`.
pub fn fnv1a32(key: &str) -> u32 {
    key.bytes().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Seeds a generator from a string key.
pub fn rng_from_key(key: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(u64::from(fnv1a32(key)))
}

/// Key used by the scenario selector: name, months, stage, role.
pub fn selection_key(state: &GameState, role: &str) -> String {
    format!(
        "{}|{}|{}|{}",
        state.character_name, state.months_elapsed, state.stage, role
    )
}

/// Key used by the reducer for randomized bonuses.
pub fn bonus_key(state: &GameState, scenario_id: &str, choice_id: &str) -> String {
    format!(
        "{}|{}|{}|{}",
        state.character_name, state.turn, scenario_id, choice_id
    )
}
