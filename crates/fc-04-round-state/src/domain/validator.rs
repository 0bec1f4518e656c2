//! Round-scoped validator snapshot entry

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::PublicKey;

/// One validator's entry in a persisted round snapshot.
///
/// Snapshots are append-only: entries are removed only by revert-driven
/// deletion of whole rounds.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundValidator {
    #[serde_as(as = "Bytes")]
    pub public_key: PublicKey,
    /// Total stake voting for this validator when the round was formed.
    pub vote_balance: u128,
    /// Round this entry belongs to.
    pub round: u64,
}

impl RoundValidator {
    pub fn new(public_key: PublicKey, vote_balance: u128, round: u64) -> Self {
        Self {
            public_key,
            vote_balance,
            round,
        }
    }
}
