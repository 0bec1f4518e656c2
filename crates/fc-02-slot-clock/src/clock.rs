//! Slot clock
//!
//! Maps timestamps to slot numbers and back across changing block times.

use crate::error::SlotResult;
use crate::lookup::BlockTimeLookup;
use crate::time_source::TimeSource;
use fc_01_milestones::{calculate_block_time, MilestoneKey, MilestoneTimeline};
use shared_types::ChainHead;
use std::sync::Arc;

/// Ephemeral description of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot number since the chain epoch.
    pub slot_number: u64,
    /// First second of the slot.
    pub start_time: u64,
    /// Last second of the slot.
    pub end_time: u64,
    /// Block time in effect for this slot.
    pub block_time: u64,
    /// Whether a block forged at the queried timestamp is on time. Only
    /// the first half of a slot counts, as a propagation safety margin.
    pub forging_status: bool,
}

/// Position reached by walking regimes up to a target height.
#[derive(Debug, Clone, Copy)]
struct RegimeCursor {
    /// Block time in effect at the target height.
    block_time: u64,
    /// Slots consumed by all completed regimes.
    cumulative_slots: u64,
    /// End timestamp of the last completed regime span (epoch if none).
    span_end_time: u64,
}

/// Bidirectional time/slot mapping over the milestone timeline.
pub struct SlotClock {
    timeline: Arc<MilestoneTimeline>,
    time: Arc<dyn TimeSource>,
}

impl SlotClock {
    pub fn new(timeline: Arc<MilestoneTimeline>, time: Arc<dyn TimeSource>) -> Self {
        Self { timeline, time }
    }

    /// Walk block-time regimes from height 1 up to `height`.
    ///
    /// Each boundary is anchored on the real timestamp of the block just
    /// before it, so the awaits must run in order: a later step needs the
    /// earlier lookups' results.
    async fn walk(&self, lookup: &BlockTimeLookup<'_>, height: u64) -> SlotResult<RegimeCursor> {
        let mut block_time = calculate_block_time(&self.timeline, 1)?;
        let mut cursor_height = 1u64;
        let mut span_end_time = 0u64;
        let mut cumulative_slots = 0u64;

        while let Some(change) = self.timeline.next_change(cursor_height, MilestoneKey::BlockTime)
        {
            if change.height > height {
                break;
            }
            let span_start = span_end_time;
            let anchor = lookup.get(change.height - 1).await?;
            span_end_time = anchor + block_time;
            cumulative_slots += (span_end_time - span_start) / block_time;
            block_time = change.value;
            cursor_height = change.height;
        }

        Ok(RegimeCursor {
            block_time,
            cumulative_slots,
            span_end_time,
        })
    }

    /// Slot number containing `timestamp`, evaluated at `height`.
    pub async fn slot_number(
        &self,
        lookup: &BlockTimeLookup<'_>,
        timestamp: u64,
        height: u64,
    ) -> SlotResult<u64> {
        let cursor = self.walk(lookup, height).await?;
        Ok(cursor.cumulative_slots
            + timestamp.saturating_sub(cursor.span_end_time) / cursor.block_time)
    }

    /// Start timestamp of `slot`, evaluated at `height`. Inverse of
    /// `slot_number`.
    pub async fn slot_time(
        &self,
        lookup: &BlockTimeLookup<'_>,
        slot: u64,
        height: u64,
    ) -> SlotResult<u64> {
        let cursor = self.walk(lookup, height).await?;
        Ok(cursor.span_end_time
            + slot.saturating_sub(cursor.cumulative_slots) * cursor.block_time)
    }

    /// Full slot description.
    ///
    /// `timestamp` defaults to now, `height` to the chain head.
    pub async fn slot_info(
        &self,
        lookup: &BlockTimeLookup<'_>,
        head: &ChainHead,
        timestamp: Option<u64>,
        height: Option<u64>,
    ) -> SlotResult<SlotInfo> {
        let timestamp = timestamp.unwrap_or_else(|| self.time.now());
        let height = height.unwrap_or(head.height);

        let cursor = self.walk(lookup, height).await?;
        let slot_number = cursor.cumulative_slots
            + timestamp.saturating_sub(cursor.span_end_time) / cursor.block_time;
        let start_time = cursor.span_end_time
            + slot_number.saturating_sub(cursor.cumulative_slots) * cursor.block_time;

        Ok(SlotInfo {
            slot_number,
            start_time,
            end_time: start_time + cursor.block_time - 1,
            block_time: cursor.block_time,
            forging_status: timestamp < start_time + cursor.block_time / 2,
        })
    }

    /// Whether forging at `timestamp` (default: now) is on time.
    pub async fn is_forging_allowed(
        &self,
        lookup: &BlockTimeLookup<'_>,
        head: &ChainHead,
        timestamp: Option<u64>,
    ) -> SlotResult<bool> {
        Ok(self
            .slot_info(lookup, head, timestamp, None)
            .await?
            .forging_status)
    }

    /// The slot after the one containing now.
    pub async fn next_slot(
        &self,
        lookup: &BlockTimeLookup<'_>,
        head: &ChainHead,
    ) -> SlotResult<u64> {
        let now = self.time.now();
        Ok(self.slot_number(lookup, now, head.height).await? + 1)
    }

    /// Milliseconds from now until the next slot opens.
    pub async fn time_in_ms_until_next_slot(
        &self,
        lookup: &BlockTimeLookup<'_>,
        head: &ChainHead,
    ) -> SlotResult<u64> {
        let now = self.time.now();
        let next = self.slot_number(lookup, now, head.height).await? + 1;
        let next_start = self.slot_time(lookup, next, head.height).await?;
        Ok(next_start.saturating_sub(now) * 1000)
    }
}
