//! In-memory port adapters.
//!
//! Used by unit and integration tests. Production wires the ports to the
//! node's storage engine and event bus.

use crate::domain::{RoundInfo, RoundValidator};
use crate::ports::outbound::{BlockStore, RoundEventBus, RoundSnapshotStore, WalletRanker};
use async_trait::async_trait;
use fc_02_slot_clock::TimestampSource;
use fc_03_validator_rotation::rank;
use parking_lot::RwLock;
use shared_types::{BlockHeader, PublicKey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory block store keyed by height.
#[derive(Default)]
pub struct InMemoryBlockStore {
    blocks: RwLock<BTreeMap<u64, BlockHeader>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, block: BlockHeader) {
        self.blocks.write().insert(block.height, block);
    }

    pub fn remove(&self, height: u64) {
        self.blocks.write().remove(&height);
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl TimestampSource for InMemoryBlockStore {
    async fn timestamp_at(&self, height: u64) -> Option<u64> {
        self.blocks.read().get(&height).map(|b| b.timestamp)
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn blocks_in_range(&self, start: u64, end: u64) -> Vec<BlockHeader> {
        self.blocks
            .read()
            .range(start..=end)
            .map(|(_, b)| b.clone())
            .collect()
    }
}

/// In-memory round snapshot store.
///
/// Counts writes so tests can assert the check-then-put idempotence of
/// the service ("persisting an existing round is a no-op").
#[derive(Default)]
pub struct InMemoryRoundSnapshotStore {
    rounds: RwLock<BTreeMap<u64, Vec<RoundValidator>>>,
    put_count: AtomicUsize,
}

impl InMemoryRoundSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls that reached the store.
    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    /// Rounds currently persisted.
    pub fn persisted_rounds(&self) -> Vec<u64> {
        self.rounds.read().keys().copied().collect()
    }
}

#[async_trait]
impl RoundSnapshotStore for InMemoryRoundSnapshotStore {
    async fn get(&self, round: u64) -> Result<Vec<RoundValidator>, String> {
        Ok(self.rounds.read().get(&round).cloned().unwrap_or_default())
    }

    async fn put(&self, round: u64, validators: Vec<RoundValidator>) -> Result<(), String> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        self.rounds.write().insert(round, validators);
        Ok(())
    }

    async fn delete_from(&self, round: u64) -> Result<(), String> {
        let mut rounds = self.rounds.write();
        let kept = rounds
            .iter()
            .filter(|(r, _)| **r < round)
            .map(|(r, v)| (*r, v.clone()))
            .collect();
        *rounds = kept;
        Ok(())
    }
}

/// Wallet ranker with a fixed validator registry.
///
/// Real ranking tracks vote balances as blocks apply; for engine tests a
/// static registry is enough, and it answers historical reconstruction
/// with the same set.
pub struct StaticWalletRanker {
    validators: Vec<(PublicKey, u128)>,
}

impl StaticWalletRanker {
    pub fn new(validators: Vec<(PublicKey, u128)>) -> Self {
        Self { validators }
    }

    fn ranked(&self, round: u64) -> Vec<RoundValidator> {
        let mut entries: Vec<RoundValidator> = self
            .validators
            .iter()
            .map(|(key, balance)| RoundValidator::new(*key, *balance, round))
            .collect();
        rank(&mut entries, |v| v.public_key, |v| v.vote_balance);
        entries
    }
}

#[async_trait]
impl WalletRanker for StaticWalletRanker {
    async fn apply_block_effects(&self, _block: &BlockHeader) -> Result<(), String> {
        Ok(())
    }

    async fn revert_block_effects(&self, _block: &BlockHeader) -> Result<(), String> {
        Ok(())
    }

    async fn ranked_validators(&self, round: &RoundInfo) -> Result<Vec<RoundValidator>, String> {
        Ok(self.ranked(round.round))
    }

    async fn previous_round_validators(
        &self,
        _blocks: &[BlockHeader],
        round: &RoundInfo,
    ) -> Result<Vec<RoundValidator>, String> {
        Ok(self.ranked(round.round))
    }
}

/// Telemetry signal recorded by `RecordingEventBus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    MissedBlock { slot: u64, validator: PublicKey },
    MissedRound { round: u64, validator: PublicKey },
    RoundApplied { round: u64 },
}

/// Event bus that records every published signal.
#[derive(Default)]
pub struct RecordingEventBus {
    events: RwLock<Vec<RoundEvent>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RoundEvent> {
        self.events.read().clone()
    }

    pub fn missed_blocks(&self) -> Vec<RoundEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| matches!(e, RoundEvent::MissedBlock { .. }))
            .cloned()
            .collect()
    }

    pub fn missed_rounds(&self) -> Vec<RoundEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| matches!(e, RoundEvent::MissedRound { .. }))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RoundEventBus for RecordingEventBus {
    async fn publish_missed_block(&self, slot: u64, validator: PublicKey) -> Result<(), String> {
        self.events
            .write()
            .push(RoundEvent::MissedBlock { slot, validator });
        Ok(())
    }

    async fn publish_missed_round(&self, round: u64, validator: PublicKey) -> Result<(), String> {
        self.events
            .write()
            .push(RoundEvent::MissedRound { round, validator });
        Ok(())
    }

    async fn publish_round_applied(&self, round: u64) -> Result<(), String> {
        self.events.write().push(RoundEvent::RoundApplied { round });
        Ok(())
    }
}
