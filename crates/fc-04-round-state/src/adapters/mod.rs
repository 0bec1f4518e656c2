pub mod memory;

pub use memory::{
    InMemoryBlockStore, InMemoryRoundSnapshotStore, RecordingEventBus, RoundEvent,
    StaticWalletRanker,
};
