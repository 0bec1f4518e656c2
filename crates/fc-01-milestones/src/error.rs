//! Error types for the milestone subsystem

use crate::milestone::MilestoneKey;

/// Configuration error types
///
/// All variants are fatal at startup: a node whose timeline cannot resolve
/// a required parameter would silently diverge from its peers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("No milestones specifying any height were found")]
    NoMilestones,

    #[error("No milestone defines {key} at or below height {height}")]
    MissingKey { key: MilestoneKey, height: u64 },

    #[error("Milestone heights must be strictly increasing: {previous} then {current}")]
    UnorderedHeights { previous: u64, current: u64 },

    #[error("Milestone at height {height} sets {key} to zero")]
    ZeroParameter { key: MilestoneKey, height: u64 },

    #[error("Schedule parse error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
