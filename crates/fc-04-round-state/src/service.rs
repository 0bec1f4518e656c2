//! Round State Service - Core business logic
//!
//! # Architecture
//! - Single-writer: the host serializes `apply_block`/`revert_block`;
//!   the interior lock is never held across an `.await`.
//! - No partial state: every outbound await completes before any
//!   in-memory mutation, so a failed lookup leaves the engine exactly as
//!   it was and the host may retry the whole operation.
//! - Reorg-safe: reverting across a round boundary reconstructs the prior
//!   round's order from persisted snapshots and replayed blocks, never
//!   from a forward cache.

use crate::domain::{round_info, starts_new_round, RoundInfo, RoundValidator};
use crate::error::{RoundStateError, RoundStateResult};
use crate::ports::{BlockStore, RoundEventBus, RoundSnapshotStore, RoundStateApi, WalletRanker};
use async_trait::async_trait;
use fc_01_milestones::{MilestoneKey, MilestoneTimeline};
use fc_02_slot_clock::{BlockTimeLookup, SlotClock, SlotInfo, TimeSource};
use fc_03_validator_rotation::shuffle_for_round;
use parking_lot::RwLock;
use shared_types::{BlockHeader, ChainHead, PublicKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable round-state, snapshotted per operation and committed whole.
#[derive(Clone, Default)]
struct RoundStateInner {
    /// The most recently applied block.
    last_block: Option<BlockHeader>,
    /// Blocks applied since the current round started.
    blocks_in_current_round: Vec<BlockHeader>,
    /// Forging order of the round in progress.
    forging_order: Vec<RoundValidator>,
    /// The round in progress.
    current_round: Option<RoundInfo>,
}

/// Round State Service
pub struct RoundStateService<B, S, W, E>
where
    B: BlockStore,
    S: RoundSnapshotStore,
    W: WalletRanker,
    E: RoundEventBus,
{
    block_store: Arc<B>,
    snapshot_store: Arc<S>,
    wallet_ranker: Arc<W>,
    event_bus: Arc<E>,
    timeline: Arc<MilestoneTimeline>,
    clock: SlotClock,
    state: RwLock<RoundStateInner>,
}

impl<B, S, W, E> RoundStateService<B, S, W, E>
where
    B: BlockStore,
    S: RoundSnapshotStore,
    W: WalletRanker,
    E: RoundEventBus,
{
    /// Create a new RoundStateService
    pub fn new(
        block_store: Arc<B>,
        snapshot_store: Arc<S>,
        wallet_ranker: Arc<W>,
        event_bus: Arc<E>,
        timeline: Arc<MilestoneTimeline>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let clock = SlotClock::new(timeline.clone(), time);
        Self {
            block_store,
            snapshot_store,
            wallet_ranker,
            event_bus,
            timeline,
            clock,
            state: RwLock::new(RoundStateInner::default()),
        }
    }

    // === STATE ACCESSORS ===

    /// The round in progress.
    pub fn current_round(&self) -> Option<RoundInfo> {
        self.state.read().current_round
    }

    /// Forging order of the round in progress.
    pub fn forging_order(&self) -> Vec<RoundValidator> {
        self.state.read().forging_order.clone()
    }

    /// Blocks applied since the current round started.
    pub fn blocks_in_current_round(&self) -> Vec<BlockHeader> {
        self.state.read().blocks_in_current_round.clone()
    }

    /// The most recently applied block.
    pub fn last_block(&self) -> Option<BlockHeader> {
        self.state.read().last_block.clone()
    }

    // === SLOT QUERIES (pass-through to the slot clock) ===

    /// Slot description at the given or default (now, head) coordinates.
    pub async fn slot_info(
        &self,
        head: &ChainHead,
        timestamp: Option<u64>,
        height: Option<u64>,
    ) -> RoundStateResult<SlotInfo> {
        let lookup = BlockTimeLookup::new(self.block_store.as_ref());
        Ok(self.clock.slot_info(&lookup, head, timestamp, height).await?)
    }

    /// Slot number containing `timestamp`, evaluated at `height`.
    pub async fn slot_number(&self, timestamp: u64, height: u64) -> RoundStateResult<u64> {
        let lookup = BlockTimeLookup::new(self.block_store.as_ref());
        Ok(self.clock.slot_number(&lookup, timestamp, height).await?)
    }

    /// Start timestamp of `slot`, evaluated at `height`.
    pub async fn slot_time(&self, slot: u64, height: u64) -> RoundStateResult<u64> {
        let lookup = BlockTimeLookup::new(self.block_store.as_ref());
        Ok(self.clock.slot_time(&lookup, slot, height).await?)
    }

    /// Whether forging now (or at `timestamp`) is on time.
    pub async fn is_forging_allowed(
        &self,
        head: &ChainHead,
        timestamp: Option<u64>,
    ) -> RoundStateResult<bool> {
        let lookup = BlockTimeLookup::new(self.block_store.as_ref());
        Ok(self
            .clock
            .is_forging_allowed(&lookup, head, timestamp)
            .await?)
    }

    /// The slot after the one containing now.
    pub async fn next_slot(&self, head: &ChainHead) -> RoundStateResult<u64> {
        let lookup = BlockTimeLookup::new(self.block_store.as_ref());
        Ok(self.clock.next_slot(&lookup, head).await?)
    }

    /// Milliseconds until the next slot opens.
    pub async fn time_in_ms_until_next_slot(&self, head: &ChainHead) -> RoundStateResult<u64> {
        let lookup = BlockTimeLookup::new(self.block_store.as_ref());
        Ok(self.clock.time_in_ms_until_next_slot(&lookup, head).await?)
    }

    // === INTERNALS ===

    fn active_validators_at(&self, height: u64) -> RoundStateResult<u64> {
        Ok(self
            .timeline
            .resolve(height, MilestoneKey::ActiveValidators)?)
    }

    /// Slots between the tracked last block and `block` that nobody
    /// filled, attributed to the validators whose turns they were.
    async fn detect_missed_blocks(
        &self,
        snapshot: &RoundStateInner,
        block: &BlockHeader,
    ) -> RoundStateResult<Vec<(u64, PublicKey)>> {
        let Some(last) = &snapshot.last_block else {
            return Ok(Vec::new());
        };
        if snapshot.forging_order.is_empty() {
            return Ok(Vec::new());
        }

        // The new block is not necessarily stored yet; the override lets
        // the regime walk anchor on the tracked last block regardless.
        let lookup =
            BlockTimeLookup::with_override(self.block_store.as_ref(), last.height, last.timestamp);
        let last_slot = self
            .clock
            .slot_number(&lookup, last.timestamp, last.height)
            .await?;
        let current_slot = self
            .clock
            .slot_number(&lookup, block.timestamp, block.height)
            .await?;

        let order_len = snapshot.forging_order.len() as u64;
        let missed = current_slot
            .saturating_sub(last_slot)
            .saturating_sub(1)
            .min(order_len);

        let mut out = Vec::with_capacity(missed as usize);
        for i in 0..missed {
            let slot = last_slot + i + 1;
            let validator = &snapshot.forging_order[(slot % order_len) as usize];
            out.push((slot, validator.public_key));
        }
        Ok(out)
    }

    /// Close the finished round and install the order for `info`.
    ///
    /// Clears `blocks` on success. The snapshot write is check-then-put:
    /// persisting an already-persisted round is a no-op.
    async fn transition_round(
        &self,
        blocks: &mut Vec<BlockHeader>,
        finished_order: &[RoundValidator],
        finished_round: u64,
        info: RoundInfo,
    ) -> RoundStateResult<Vec<RoundValidator>> {
        for validator in finished_order {
            let forged = blocks
                .iter()
                .any(|b| b.generator_public_key == validator.public_key);
            if !forged {
                warn!(
                    round = finished_round,
                    validator = %hex::encode(validator.public_key),
                    "validator missed round"
                );
                self.event_bus
                    .publish_missed_round(finished_round, validator.public_key)
                    .await
                    .map_err(RoundStateError::EventBus)?;
            }
        }

        let mut ranked = self
            .wallet_ranker
            .ranked_validators(&info)
            .await
            .map_err(RoundStateError::Ranking)?;
        for validator in &mut ranked {
            validator.round = info.round;
        }

        if self
            .snapshot_store
            .get(info.round)
            .await
            .map_err(RoundStateError::Store)?
            .is_empty()
        {
            self.snapshot_store
                .put(info.round, ranked.clone())
                .await
                .map_err(RoundStateError::Store)?;
        }

        let order = shuffle_for_round(info.round, ranked);
        blocks.clear();

        self.event_bus
            .publish_round_applied(info.round)
            .await
            .map_err(RoundStateError::EventBus)?;
        info!(round = info.round, validators = order.len(), "round applied");

        Ok(order)
    }
}

#[async_trait]
impl<B, S, W, E> RoundStateApi for RoundStateService<B, S, W, E>
where
    B: BlockStore,
    S: RoundSnapshotStore,
    W: WalletRanker,
    E: RoundEventBus,
{
    async fn apply_block(&self, block: &BlockHeader) -> RoundStateResult<()> {
        let snapshot = self.state.read().clone();

        for (slot, validator) in self.detect_missed_blocks(&snapshot, block).await? {
            debug!(slot, validator = %hex::encode(validator), "validator missed block");
            self.event_bus
                .publish_missed_block(slot, validator)
                .await
                .map_err(RoundStateError::EventBus)?;
        }

        self.wallet_ranker
            .apply_block_effects(block)
            .await
            .map_err(RoundStateError::Ranking)?;

        let mut blocks = snapshot.blocks_in_current_round;
        blocks.push(block.clone());

        let next_height = block.height + 1;
        let max_next = self.active_validators_at(next_height)?;
        let mut forging_order = snapshot.forging_order;
        let mut current_round = snapshot.current_round;

        if block.height == 1 || starts_new_round(next_height, max_next) {
            let info = round_info(next_height, max_next);
            let finished_round =
                round_info(block.height, self.active_validators_at(block.height)?).round;
            forging_order = self
                .transition_round(&mut blocks, &forging_order, finished_round, info)
                .await?;
            current_round = Some(info);
        }

        let mut state = self.state.write();
        state.last_block = Some(block.clone());
        state.blocks_in_current_round = blocks;
        state.forging_order = forging_order;
        state.current_round = current_round;
        Ok(())
    }

    async fn revert_block(&self, block: &BlockHeader) -> RoundStateResult<()> {
        let snapshot = self.state.read().clone();
        let info = round_info(block.height, self.active_validators_at(block.height)?);

        let mut blocks = snapshot.blocks_in_current_round;
        if blocks.is_empty() {
            blocks = self
                .block_store
                .blocks_in_range(info.round_height, block.height)
                .await;
            let expected = block.height - info.round_height + 1;
            if blocks.len() as u64 != expected {
                return Err(RoundStateError::RoundBlockCountMismatch {
                    round: info.round,
                    expected,
                    actual: blocks.len() as u64,
                });
            }
        }

        let tail = blocks.last().ok_or(RoundStateError::EmptyRound)?;
        if tail.id() != block.id() {
            return Err(RoundStateError::RevertNonTail {
                height: block.height,
                expected: hex::encode(tail.id()),
                actual: hex::encode(block.id()),
            });
        }

        self.wallet_ranker
            .revert_block_effects(block)
            .await
            .map_err(RoundStateError::Ranking)?;

        if block.height == 1 {
            // Undoing genesis leaves an empty chain.
            self.snapshot_store
                .delete_from(1)
                .await
                .map_err(RoundStateError::Store)?;
            let mut state = self.state.write();
            *state = RoundStateInner::default();
            return Ok(());
        }

        let mut forging_order = snapshot.forging_order;
        let mut current_round = snapshot.current_round;

        if info.next_round != info.round {
            // The reverted block closed its round, so the transition into
            // the next round must be undone. Ranking as it stood back then
            // cannot be re-derived forward; the collaborator reconstructs
            // it from the round's replayed blocks.
            let mut ranked = self
                .wallet_ranker
                .previous_round_validators(&blocks, &info)
                .await
                .map_err(RoundStateError::Ranking)?;
            for validator in &mut ranked {
                validator.round = info.round;
            }
            self.snapshot_store
                .delete_from(info.round + 1)
                .await
                .map_err(RoundStateError::Store)?;
            forging_order = shuffle_for_round(info.round, ranked);
            current_round = Some(info);
            info!(round = info.round, "round reverted");
        }

        blocks.pop();
        let last_block = match blocks.last() {
            Some(b) => b.clone(),
            None => self
                .block_store
                .blocks_in_range(block.height - 1, block.height - 1)
                .await
                .into_iter()
                .next()
                .ok_or(RoundStateError::MissingBlock {
                    height: block.height - 1,
                })?,
        };

        let mut state = self.state.write();
        state.last_block = Some(last_block);
        state.blocks_in_current_round = blocks;
        state.forging_order = forging_order;
        state.current_round = current_round;
        Ok(())
    }

    async fn restore(&self, head: &ChainHead) -> RoundStateResult<()> {
        let snapshot = self.state.read().clone();
        let next_height = head.height + 1;
        let info = round_info(next_height, self.active_validators_at(next_height)?);

        let mut blocks = snapshot.blocks_in_current_round;
        if blocks.is_empty() && info.round_height <= head.height {
            blocks = self
                .block_store
                .blocks_in_range(info.round_height, head.height)
                .await;
        }
        let expected = (head.height + 1).saturating_sub(info.round_height);
        if blocks.len() as u64 != expected {
            return Err(RoundStateError::RoundBlockCountMismatch {
                round: info.round,
                expected,
                actual: blocks.len() as u64,
            });
        }

        let last_block = match blocks.last() {
            Some(b) => b.clone(),
            None => self
                .block_store
                .blocks_in_range(head.height, head.height)
                .await
                .into_iter()
                .next()
                .ok_or(RoundStateError::MissingBlock {
                    height: head.height,
                })?,
        };

        let mut ranked = self
            .wallet_ranker
            .ranked_validators(&info)
            .await
            .map_err(RoundStateError::Ranking)?;
        for validator in &mut ranked {
            validator.round = info.round;
        }

        if self
            .snapshot_store
            .get(info.round)
            .await
            .map_err(RoundStateError::Store)?
            .is_empty()
        {
            self.snapshot_store
                .put(info.round, ranked.clone())
                .await
                .map_err(RoundStateError::Store)?;
        }
        // Snapshots past the live round are leftovers from before the
        // restart and would shadow future transitions.
        self.snapshot_store
            .delete_from(info.round + 1)
            .await
            .map_err(RoundStateError::Store)?;

        let forging_order = shuffle_for_round(info.round, ranked);
        info!(
            round = info.round,
            height = head.height,
            "round state restored"
        );

        let mut state = self.state.write();
        state.last_block = Some(last_block);
        state.blocks_in_current_round = blocks;
        state.forging_order = forging_order;
        state.current_round = Some(info);
        Ok(())
    }

    async fn get_active_validators(
        &self,
        round: Option<RoundInfo>,
        head: &ChainHead,
    ) -> RoundStateResult<Vec<RoundValidator>> {
        let snapshot = self.state.read().clone();
        let info = match round {
            Some(info) => info,
            None => match snapshot.current_round {
                Some(info) => info,
                None => {
                    // Empty chain: no round exists yet.
                    if head.height == 0 {
                        return Ok(Vec::new());
                    }
                    round_info(head.height, self.active_validators_at(head.height)?)
                }
            },
        };

        if let Some(current) = snapshot.current_round {
            if current.round == info.round && !snapshot.forging_order.is_empty() {
                return Ok(snapshot.forging_order);
            }
        }

        let stored = self
            .snapshot_store
            .get(info.round)
            .await
            .map_err(RoundStateError::Store)?;
        if stored.is_empty() {
            // Never-persisted round: empty, not an error.
            return Ok(Vec::new());
        }
        Ok(shuffle_for_round(info.round, stored))
    }
}
