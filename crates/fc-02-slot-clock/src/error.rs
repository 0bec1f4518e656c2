//! Error types for the slot clock

use fc_01_milestones::ConfigurationError;

/// Slot clock error types
///
/// A `LookupMiss` propagates out of whatever apply/revert the walk was
/// serving; the operation is treated as not having happened and the host
/// decides whether to resync. There are no retries at this level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("No stored block at height {height} to anchor a regime boundary")]
    LookupMiss { height: u64 },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type for slot clock operations
pub type SlotResult<T> = Result<T, SlotError>;
