//! Driving ports (inbound API)

use crate::domain::{RoundInfo, RoundValidator};
use crate::error::RoundStateResult;
use async_trait::async_trait;
use shared_types::{BlockHeader, ChainHead};

/// The engine's surface toward the host.
///
/// The host must serialize `apply_block`/`revert_block` calls: the chain
/// is a linear log and there is exactly one writer. Read-only queries are
/// safe under concurrent invocation.
#[async_trait]
pub trait RoundStateApi: Send + Sync {
    /// Track an applied block, detect missed slots, and transition the
    /// round when the block closes one.
    async fn apply_block(&self, block: &BlockHeader) -> RoundStateResult<()>;

    /// Undo the most recently applied block. Fatal if `block` is not the
    /// tracked tail.
    async fn revert_block(&self, block: &BlockHeader) -> RoundStateResult<()>;

    /// Startup/resync path: rebuild round state from the last known head.
    async fn restore(&self, head: &ChainHead) -> RoundStateResult<()>;

    /// Forging order for a round, live or historical. A never-persisted
    /// round yields an empty list.
    async fn get_active_validators(
        &self,
        round: Option<RoundInfo>,
        head: &ChainHead,
    ) -> RoundStateResult<Vec<RoundValidator>>;
}
