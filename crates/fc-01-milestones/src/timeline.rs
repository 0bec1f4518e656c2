//! Milestone timeline queries

use crate::error::{ConfigurationError, ConfigurationResult};
use crate::milestone::{Milestone, MilestoneKey};

/// The next height at which a parameter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneChange {
    /// Height at which the new value takes effect.
    pub height: u64,
    /// The new value.
    pub value: u64,
}

/// Immutable, height-ordered milestone timeline.
#[derive(Debug, Clone)]
pub struct MilestoneTimeline {
    milestones: Vec<Milestone>,
}

impl MilestoneTimeline {
    /// Build a timeline, rejecting out-of-order or duplicate heights and
    /// zero-valued divisor parameters.
    pub fn new(milestones: Vec<Milestone>) -> ConfigurationResult<Self> {
        for pair in milestones.windows(2) {
            if pair[1].height <= pair[0].height {
                return Err(ConfigurationError::UnorderedHeights {
                    previous: pair[0].height,
                    current: pair[1].height,
                });
            }
        }
        // Slot and round arithmetic divide by these; a zero anywhere in the
        // schedule would panic mid-operation instead of failing at startup.
        for m in &milestones {
            for key in [MilestoneKey::BlockTime, MilestoneKey::ActiveValidators] {
                if m.field(key) == Some(0) {
                    return Err(ConfigurationError::ZeroParameter {
                        key,
                        height: m.height,
                    });
                }
            }
        }
        Ok(Self { milestones })
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Highest milestone with height at or below `height`.
    pub fn get(&self, height: u64) -> Option<&Milestone> {
        self.milestones
            .iter()
            .rev()
            .find(|m| m.height <= height)
    }

    /// The milestone record exactly at `height`, if one exists.
    pub fn boundary_at(&self, height: u64) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.height == height)
    }

    /// Effective value of `key` at `height`, if any milestone at or below
    /// `height` defines it.
    pub fn value_at(&self, height: u64, key: MilestoneKey) -> Option<u64> {
        self.milestones
            .iter()
            .rev()
            .filter(|m| m.height <= height)
            .find_map(|m| m.field(key))
    }

    /// Effective value of a required key at `height`.
    ///
    /// Fatal if the timeline is empty or no milestone reachable from
    /// height 1 defines the key.
    pub fn resolve(&self, height: u64, key: MilestoneKey) -> ConfigurationResult<u64> {
        if self.milestones.is_empty() {
            return Err(ConfigurationError::NoMilestones);
        }
        self.value_at(height, key)
            .ok_or(ConfigurationError::MissingKey { key, height })
    }

    /// First milestone after `height` whose value for `key` differs from
    /// the effective value at `height`.
    ///
    /// `None` means the current value holds forever. Milestones that do not
    /// set `key`, or that repeat the current value, are not changes.
    pub fn next_change(&self, height: u64, key: MilestoneKey) -> Option<MilestoneChange> {
        let current = self.value_at(height, key);
        self.milestones
            .iter()
            .filter(|m| m.height > height)
            .find_map(|m| match m.field(key) {
                Some(value) if Some(value) != current => Some(MilestoneChange {
                    height: m.height,
                    value,
                }),
                _ => None,
            })
    }
}
