//! Milestone records and schedule configuration

use crate::error::{ConfigurationError, ConfigurationResult};
use crate::timeline::MilestoneTimeline;
use serde::{Deserialize, Serialize};

/// Network parameters a milestone may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MilestoneKey {
    /// Seconds between slots.
    BlockTime,
    /// Number of validators per round.
    ActiveValidators,
    /// Block reward in base units.
    Reward,
}

impl std::fmt::Display for MilestoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MilestoneKey::BlockTime => write!(f, "block_time"),
            MilestoneKey::ActiveValidators => write!(f, "active_validators"),
            MilestoneKey::Reward => write!(f, "reward"),
        }
    }
}

/// A single milestone record.
///
/// Fields left unset do not change at this height; the effective value is
/// whatever an earlier milestone established. Height 1 must define every
/// key the engine requires (`block_time`, `active_validators`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Height at which this record takes effect.
    pub height: u64,

    /// Seconds between slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_time: Option<u64>,

    /// Number of validators per round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_validators: Option<u64>,

    /// Block reward in base units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<u64>,
}

impl Milestone {
    /// Milestone that only sets a height (changes nothing).
    pub fn at(height: u64) -> Self {
        Self {
            height,
            block_time: None,
            active_validators: None,
            reward: None,
        }
    }

    pub fn with_block_time(mut self, block_time: u64) -> Self {
        self.block_time = Some(block_time);
        self
    }

    pub fn with_active_validators(mut self, active_validators: u64) -> Self {
        self.active_validators = Some(active_validators);
        self
    }

    pub fn with_reward(mut self, reward: u64) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Value this record sets for `key`, if any.
    pub fn field(&self, key: MilestoneKey) -> Option<u64> {
        match key {
            MilestoneKey::BlockTime => self.block_time,
            MilestoneKey::ActiveValidators => self.active_validators,
            MilestoneKey::Reward => self.reward,
        }
    }
}

/// Network schedule configuration.
///
/// Loaded once at startup; the timeline built from it is immutable for the
/// life of the process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSchedule {
    /// Unix timestamp of the chain epoch (genesis wall-clock time).
    pub epoch: u64,

    /// Milestone records, heights strictly increasing.
    pub milestones: Vec<Milestone>,
}

impl NetworkSchedule {
    /// Parse a schedule from its JSON representation.
    pub fn from_json(raw: &str) -> ConfigurationResult<Self> {
        serde_json::from_str(raw).map_err(|e| ConfigurationError::ParseError(e.to_string()))
    }

    /// Build the validated milestone timeline.
    pub fn timeline(&self) -> ConfigurationResult<MilestoneTimeline> {
        MilestoneTimeline::new(self.milestones.clone())
    }
}
