//! # Scheduling Flows
//!
//! Slot arithmetic and validator rotation exercised through the full
//! engine, across a block-time change: 8-second blocks for heights 1..=5,
//! 4-second blocks from height 6. The boundary is anchored on the real
//! timestamp of height 5, so with on-time blocks the second regime opens
//! at timestamp 40 as slot 5.
//!
//! Same validator registry as the lifecycle flows (balances 300/200/100),
//! so forging orders are [3, 2, 1], [3, 1, 2], [1, 3, 2] for rounds 1-3.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fc_01_milestones::{Milestone, MilestoneTimeline};
    use fc_02_slot_clock::FixedTimeSource;
    use fc_04_round_state::adapters::{
        InMemoryBlockStore, InMemoryRoundSnapshotStore, RecordingEventBus, RoundEvent,
        StaticWalletRanker,
    };
    use fc_04_round_state::{RoundSnapshotStore, RoundStateApi, RoundStateService};
    use shared_types::{BlockHeader, ChainHead, PublicKey};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    type TestService = RoundStateService<
        InMemoryBlockStore,
        InMemoryRoundSnapshotStore,
        StaticWalletRanker,
        RecordingEventBus,
    >;

    struct Node {
        store: Arc<InMemoryBlockStore>,
        snapshots: Arc<InMemoryRoundSnapshotStore>,
        bus: Arc<RecordingEventBus>,
        service: TestService,
    }

    fn key(id: u8) -> PublicKey {
        [id; 33]
    }

    /// Two block-time regimes, constant validator count.
    fn node_at(now: u64) -> Node {
        let timeline = Arc::new(
            MilestoneTimeline::new(vec![
                Milestone::at(1).with_block_time(8).with_active_validators(3),
                Milestone::at(6).with_block_time(4),
            ])
            .unwrap(),
        );
        let store = Arc::new(InMemoryBlockStore::new());
        let snapshots = Arc::new(InMemoryRoundSnapshotStore::new());
        let bus = Arc::new(RecordingEventBus::new());
        let ranker = Arc::new(StaticWalletRanker::new(vec![
            (key(1), 300),
            (key(2), 200),
            (key(3), 100),
        ]));
        let service = RoundStateService::new(
            store.clone(),
            snapshots.clone(),
            ranker,
            bus.clone(),
            timeline,
            Arc::new(FixedTimeSource(now)),
        );
        Node {
            store,
            snapshots,
            bus,
            service,
        }
    }

    fn block_at(height: u64, timestamp: u64, generator: u8) -> BlockHeader {
        BlockHeader {
            version: 1,
            height,
            previous_block: [0; 32],
            timestamp,
            generator_public_key: key(generator),
        }
    }

    async fn forge(node: &Node, b: &BlockHeader) {
        node.store.insert(b.clone());
        node.service.apply_block(b).await.unwrap();
    }

    /// Heights 1..=5 forged on time in the first regime: slots 0..=4,
    /// generators following rounds 1 and 2.
    async fn forge_first_regime(node: &Node) {
        for (height, timestamp, generator) in
            [(1, 0, 3), (2, 8, 2), (3, 16, 1), (4, 24, 3), (5, 32, 1)]
        {
            forge(node, &block_at(height, timestamp, generator)).await;
        }
    }

    // =========================================================================
    // SLOT CONTINUITY ACROSS A BLOCK-TIME CHANGE
    // =========================================================================

    #[tokio::test]
    async fn test_slots_stay_consecutive_across_the_regime_boundary() {
        let node = node_at(0);
        forge_first_regime(&node).await;

        // Height 6 opens the 4-second regime at timestamp 40, slot 5.
        forge(&node, &block_at(6, 40, 2)).await;
        // Round 3 is now live with order [1, 3, 2]; slot 6 is key 1's.
        forge(&node, &block_at(7, 44, 1)).await;

        assert!(node.bus.missed_blocks().is_empty());
        assert!(node.bus.missed_rounds().is_empty());

        assert_eq!(node.service.slot_number(32, 5).await.unwrap(), 4);
        assert_eq!(node.service.slot_number(40, 6).await.unwrap(), 5);
        assert_eq!(node.service.slot_number(44, 7).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_late_block_after_the_boundary_attributes_short_slots() {
        let node = node_at(0);
        forge_first_regime(&node).await;

        // Two 4-second slots pass empty; the round-closing block lands in
        // slot 7. Round 2's order is [3, 1, 2]: slot 5 was key 2's turn,
        // slot 6 key 3's.
        forge(&node, &block_at(6, 48, 1)).await;

        assert_eq!(
            node.bus.missed_blocks(),
            vec![
                RoundEvent::MissedBlock {
                    slot: 5,
                    validator: key(2),
                },
                RoundEvent::MissedBlock {
                    slot: 6,
                    validator: key(3),
                },
            ]
        );
        // Key 2 produced nothing in all of round 2 (heights 4..=6).
        assert_eq!(
            node.bus.missed_rounds(),
            vec![RoundEvent::MissedRound {
                round: 2,
                validator: key(2),
            }]
        );
    }

    #[tokio::test]
    async fn test_missed_slot_attribution_caps_at_one_rotation() {
        let node = node_at(0);
        forge(&node, &block_at(1, 0, 3)).await;

        // Nine slots pass empty; only one full rotation is attributed.
        forge(&node, &block_at(2, 80, 1)).await;

        assert_eq!(
            node.bus.missed_blocks(),
            vec![
                RoundEvent::MissedBlock {
                    slot: 1,
                    validator: key(2),
                },
                RoundEvent::MissedBlock {
                    slot: 2,
                    validator: key(1),
                },
                RoundEvent::MissedBlock {
                    slot: 3,
                    validator: key(3),
                },
            ]
        );
    }

    // =========================================================================
    // SLOT QUERIES THROUGH THE ENGINE
    // =========================================================================

    #[tokio::test]
    async fn test_slot_queries_answer_for_both_regimes() {
        let node = node_at(42);
        forge_first_regime(&node).await;
        let head = ChainHead::new(5);

        // Evaluated at height 6 the clock is in the 4-second regime: now
        // (42) falls in slot 5, which spans 40..=43.
        let info = node.service.slot_info(&head, None, Some(6)).await.unwrap();
        assert_eq!(info.slot_number, 5);
        assert_eq!(info.start_time, 40);
        assert_eq!(info.end_time, 43);
        assert_eq!(info.block_time, 4);
        // 42 is past the half-slot mark (40 + 2).
        assert!(!info.forging_status);

        let early = node
            .service
            .slot_info(&head, Some(41), Some(6))
            .await
            .unwrap();
        assert!(early.forging_status);

        // At the head's own height the 8-second regime still rules: slot 5
        // spans 40..=47 and forging closes at 44 exactly.
        assert!(node
            .service
            .is_forging_allowed(&head, Some(43))
            .await
            .unwrap());
        assert!(!node
            .service
            .is_forging_allowed(&head, Some(44))
            .await
            .unwrap());

        assert_eq!(node.service.next_slot(&head).await.unwrap(), 6);
        assert_eq!(
            node.service.time_in_ms_until_next_slot(&head).await.unwrap(),
            6_000
        );
    }

    // =========================================================================
    // SNAPSHOTS VS FORGING ORDER
    // =========================================================================

    #[tokio::test]
    async fn test_snapshots_persist_ranked_order_not_shuffled() {
        let node = node_at(0);
        for (height, timestamp, generator) in [(1, 0, 3), (2, 8, 2), (3, 16, 1)] {
            forge(&node, &block_at(height, timestamp, generator)).await;
        }

        // Stored: ranking order, descending balance.
        let stored = node.snapshots.get(2).await.unwrap();
        assert_eq!(
            stored.iter().map(|v| v.public_key[0]).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            stored.iter().map(|v| v.vote_balance).collect::<Vec<_>>(),
            vec![300, 200, 100]
        );
        assert!(stored.iter().all(|v| v.round == 2));

        // Live: the same set permuted by the round-2 shuffle.
        assert_eq!(
            node.service
                .forging_order()
                .iter()
                .map(|v| v.public_key[0])
                .collect::<Vec<_>>(),
            vec![3, 1, 2]
        );
    }
}
