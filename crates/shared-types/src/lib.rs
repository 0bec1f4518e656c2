//! # shared-types
//!
//! Domain entities shared across the Forge-Chain subsystem crates.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`, `ChainHead`
//! - **Identity**: `Hash`, `PublicKey`

pub mod entities;

pub use entities::{BlockHeader, ChainHead, Hash, PublicKey};
