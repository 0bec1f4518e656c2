//! Round arithmetic
//!
//! A round is a contiguous height span equal to the active-validator count.
//! Genesis is height 1, so round 1 spans heights 1..=max_validators.

use serde::{Deserialize, Serialize};

/// Derived description of the round containing a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// Round number, starting at 1.
    pub round: u64,
    /// First height of the round.
    pub round_height: u64,
    /// Round of the next height: `round + 1` when the height closes the
    /// round, otherwise `round`.
    pub next_round: u64,
    /// Active-validator count in effect for this round.
    pub max_validators: u64,
}

/// Round description for `height` under `max_validators`.
pub fn round_info(height: u64, max_validators: u64) -> RoundInfo {
    let round = (height - 1) / max_validators + 1;
    let round_height = (round - 1) * max_validators + 1;
    let next_round = if height == round_height + max_validators - 1 {
        round + 1
    } else {
        round
    };
    RoundInfo {
        round,
        round_height,
        next_round,
        max_validators,
    }
}

/// Whether `height` is the first height of a round.
pub fn starts_new_round(height: u64, max_validators: u64) -> bool {
    (height - 1) % max_validators == 0
}
