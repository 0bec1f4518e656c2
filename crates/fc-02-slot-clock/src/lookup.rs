//! Historical block-time lookup
//!
//! Regime boundaries are anchored on the real timestamp of the block just
//! before the boundary height. Those timestamps come from the external
//! block store through the `TimestampSource` port.

use crate::error::{SlotError, SlotResult};
use async_trait::async_trait;

/// Read contract onto the external block store.
#[async_trait]
pub trait TimestampSource: Send + Sync {
    /// Timestamp (seconds since chain epoch) of the stored block at
    /// `height`, or `None` if no such block is stored.
    async fn timestamp_at(&self, height: u64) -> Option<u64>;
}

/// Call-scoped lookup over a `TimestampSource`.
///
/// Height 1 is defined as timestamp 0; the epoch offset is applied outside
/// this core. A missing block at any other height is a `LookupMiss`.
///
/// The override is an explicit, per-call constructor argument rather than
/// a settable callback, so speculative computation for a block that is not
/// stored yet can never leak into a concurrent query.
pub struct BlockTimeLookup<'a> {
    source: &'a dyn TimestampSource,
    override_entry: Option<(u64, u64)>,
}

impl<'a> BlockTimeLookup<'a> {
    pub fn new(source: &'a dyn TimestampSource) -> Self {
        Self {
            source,
            override_entry: None,
        }
    }

    /// Lookup that answers `timestamp` for `height` without consulting the
    /// store, for exactly this one call.
    pub fn with_override(source: &'a dyn TimestampSource, height: u64, timestamp: u64) -> Self {
        Self {
            source,
            override_entry: Some((height, timestamp)),
        }
    }

    /// Timestamp of the block at `height`.
    pub async fn get(&self, height: u64) -> SlotResult<u64> {
        if let Some((h, ts)) = self.override_entry {
            if h == height {
                return Ok(ts);
            }
        }
        if height == 1 {
            return Ok(0);
        }
        self.source
            .timestamp_at(height)
            .await
            .ok_or(SlotError::LookupMiss { height })
    }
}
