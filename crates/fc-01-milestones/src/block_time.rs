//! Block-time calculator
//!
//! The block time in effect at a height, and regime-start detection. A
//! *regime* is a maximal height span sharing one effective block time;
//! slot arithmetic in fc-02-slot-clock is anchored on regime boundaries,
//! so both answers must be identical on every node.

use crate::error::ConfigurationResult;
use crate::milestone::MilestoneKey;
use crate::timeline::MilestoneTimeline;

/// Block time in effect at `height`.
///
/// Scans milestones newest to oldest and returns the first defined block
/// time at or below `height`. Fatal if the timeline cannot answer.
pub fn calculate_block_time(timeline: &MilestoneTimeline, height: u64) -> ConfigurationResult<u64> {
    timeline.resolve(height, MilestoneKey::BlockTime)
}

/// Whether `height` starts a new block-time regime.
///
/// True for height 1 always. Otherwise true iff `height` is a milestone
/// boundary whose block time differs from the most recent distinct block
/// time before it. A milestone that repeats the current block time, or
/// that changes only unrelated keys, does not start a regime.
pub fn is_new_block_time(timeline: &MilestoneTimeline, height: u64) -> bool {
    if height == 1 {
        return true;
    }

    let Some(boundary) = timeline.boundary_at(height) else {
        return false;
    };
    let Some(block_time) = boundary.block_time else {
        return false;
    };

    // Most recently accepted block time below this boundary. Consecutive
    // milestones repeating the same value collapse into one regime.
    match timeline.value_at(height - 1, MilestoneKey::BlockTime) {
        Some(previous) => previous != block_time,
        None => true,
    }
}
