//! # fc-01-milestones
//!
//! Height-indexed network configuration for Forge-Chain.
//!
//! A *milestone* changes one or more network parameters at a specific
//! height. The timeline answers two questions deterministically on every
//! node:
//!
//! - what is the value of parameter K at height H, and
//! - at which height after H does K next change.
//!
//! The block-time calculator sits on top of the timeline and decides the
//! block time in effect at any height, plus whether a height starts a new
//! block-time regime. Regime boundaries anchor all slot arithmetic, so
//! these answers must be bit-exact across independent nodes.

pub mod block_time;
pub mod error;
pub mod milestone;
pub mod timeline;

pub use block_time::{calculate_block_time, is_new_block_time};
pub use error::{ConfigurationError, ConfigurationResult};
pub use milestone::{Milestone, MilestoneKey, NetworkSchedule};
pub use timeline::{MilestoneChange, MilestoneTimeline};
