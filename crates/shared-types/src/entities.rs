//! # Core Domain Entities
//!
//! The minimal chain entities the forging engine operates on. The engine
//! only ever reads block headers; transaction bodies, signatures, and
//! balances live with external collaborators.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 33-byte compressed secp256k1 public key identifying a validator.
pub type PublicKey = [u8; 33];

/// The header of a block as seen by the scheduling engine.
///
/// `timestamp` is expressed in seconds since the chain epoch, not Unix
/// time. The epoch offset is applied by the host before headers reach
/// this core.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u16,
    /// Block height in the chain (genesis is height 1).
    pub height: u64,
    /// Hash of the parent block.
    pub previous_block: Hash,
    /// Seconds since the chain epoch when the block was forged.
    pub timestamp: u64,
    /// The validator who forged this block.
    #[serde_as(as = "Bytes")]
    pub generator_public_key: PublicKey,
}

impl BlockHeader {
    /// Compute the block id.
    pub fn id(&self) -> Hash {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.previous_block);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.generator_public_key);
        hasher.finalize().into()
    }
}

/// Explicit chain-head context.
///
/// Every query that the source system resolved against an ambient "current
/// height" takes this by reference instead, so no call depends on mutable
/// global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    /// Height of the last applied block.
    pub height: u64,
}

impl ChainHead {
    pub fn new(height: u64) -> Self {
        Self { height }
    }
}
