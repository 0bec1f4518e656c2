//! Error types for the round-state subsystem

use fc_01_milestones::ConfigurationError;
use fc_02_slot_clock::SlotError;

/// Round-state error types
///
/// `RevertNonTail`, `EmptyRound`, and `RoundBlockCountMismatch` indicate
/// corrupted or desynchronized local state; the host must terminate rather
/// than retry, or the node silently diverges from its peers. Lookup and
/// store failures abort the surrounding apply/revert without mutating any
/// in-memory state, so the host may retry the whole operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoundStateError {
    #[error("Reverted block {actual} at height {height} is not the tracked tail {expected}")]
    RevertNonTail {
        height: u64,
        expected: String,
        actual: String,
    },

    #[error("No blocks tracked in the current round to revert")]
    EmptyRound,

    #[error("Round {round} has {actual} stored blocks, expected {expected}")]
    RoundBlockCountMismatch {
        round: u64,
        expected: u64,
        actual: u64,
    },

    #[error("No stored block at height {height}")]
    MissingBlock { height: u64 },

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Snapshot store error: {0}")]
    Store(String),

    #[error("Wallet ranking error: {0}")]
    Ranking(String),

    #[error("Event bus error: {0}")]
    EventBus(String),
}

/// Result type for round-state operations
pub type RoundStateResult<T> = Result<T, RoundStateError>;
