pub mod inbound;
pub mod outbound;

pub use inbound::RoundStateApi;
pub use outbound::{BlockStore, RoundEventBus, RoundSnapshotStore, WalletRanker};
