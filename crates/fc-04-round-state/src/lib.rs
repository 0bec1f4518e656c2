//! # fc-04-round-state
//!
//! Round-state engine: tracks the live round as blocks apply and revert,
//! maintains the shuffled forging order, persists per-round validator
//! snapshots, and attributes missed slots and missed rounds.
//!
//! ## Architecture
//!
//! Hexagonal. The engine is a service behind the `RoundStateApi` inbound
//! port with four outbound collaborators: a block store, a round snapshot
//! store, a wallet ranker, and an event bus. In-memory adapters back the
//! test suites; production wires the ports to the node's storage engine
//! and bus.
//!
//! The host serializes `apply_block`/`revert_block`; internally every
//! outbound await completes before the state commit, so a failed
//! collaborator call leaves the engine untouched and retryable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fc_04_round_state::{RoundStateApi, RoundStateService};
//!
//! let service = RoundStateService::new(
//!     block_store,
//!     snapshot_store,
//!     wallet_ranker,
//!     event_bus,
//!     timeline,
//!     time_source,
//! );
//!
//! service.restore(&head).await?;
//! service.apply_block(&block).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{round_info, starts_new_round, RoundInfo, RoundValidator};
pub use error::{RoundStateError, RoundStateResult};
pub use ports::{BlockStore, RoundEventBus, RoundSnapshotStore, RoundStateApi, WalletRanker};
pub use service::RoundStateService;
