//! Driven ports (outbound dependencies)
//!
//! The round-state engine consumes four collaborators. All of them are
//! awaited in strict dependency order; none are retried here. Failures
//! surface as `RoundStateError` and the whole apply/revert is treated as
//! not having happened.

use crate::domain::{RoundInfo, RoundValidator};
use async_trait::async_trait;
use fc_02_slot_clock::TimestampSource;
use shared_types::{BlockHeader, PublicKey};

/// Read contract onto the external block store.
///
/// Extends `TimestampSource` so the same store anchors the slot clock's
/// regime walk.
#[async_trait]
pub trait BlockStore: TimestampSource {
    /// Stored blocks with heights in `start..=end`, ascending. Missing
    /// heights are simply absent; callers check the count.
    async fn blocks_in_range(&self, start: u64, end: u64) -> Vec<BlockHeader>;
}

/// Persisted per-round validator snapshots.
///
/// Only single-key put/delete atomicity is required; the engine never
/// needs multi-key transactions. Idempotence of `put` is enforced by the
/// service as an explicit check-then-put, not here, so tests can assert
/// that no second write happens.
#[async_trait]
pub trait RoundSnapshotStore: Send + Sync {
    /// The snapshot for `round`. A never-persisted round is an empty list,
    /// not an error.
    async fn get(&self, round: u64) -> Result<Vec<RoundValidator>, String>;

    /// Persist the snapshot for `round`.
    async fn put(&self, round: u64, validators: Vec<RoundValidator>) -> Result<(), String>;

    /// Delete snapshots for all rounds `>= round`.
    async fn delete_from(&self, round: u64) -> Result<(), String>;
}

/// Wallet ranking collaborator.
///
/// Owns all balance bookkeeping; the engine only forwards block effects
/// and consumes ranked results. Ranked lists must be in deterministic
/// ranking order: descending vote balance, ties by ascending public key.
#[async_trait]
pub trait WalletRanker: Send + Sync {
    /// Forward the balance effects of an applied block.
    async fn apply_block_effects(&self, block: &BlockHeader) -> Result<(), String>;

    /// Undo the balance effects of a reverted block.
    async fn revert_block_effects(&self, block: &BlockHeader) -> Result<(), String>;

    /// Ranked active set for the round being formed.
    async fn ranked_validators(&self, round: &RoundInfo) -> Result<Vec<RoundValidator>, String>;

    /// Ranked set as it stood when `round` was formed, reconstructed from
    /// that round's replayed blocks. The forward ranking cannot be reused:
    /// balances have moved since the round started.
    async fn previous_round_validators(
        &self,
        blocks: &[BlockHeader],
        round: &RoundInfo,
    ) -> Result<Vec<RoundValidator>, String>;
}

/// Telemetry signals emitted by the engine.
#[async_trait]
pub trait RoundEventBus: Send + Sync {
    /// A slot passed with no block from its entitled validator.
    async fn publish_missed_block(&self, slot: u64, validator: PublicKey) -> Result<(), String>;

    /// An active validator produced zero blocks in a finished round.
    async fn publish_missed_round(&self, round: u64, validator: PublicKey) -> Result<(), String>;

    /// A round transition completed and its order is in effect.
    async fn publish_round_applied(&self, round: u64) -> Result<(), String>;
}
