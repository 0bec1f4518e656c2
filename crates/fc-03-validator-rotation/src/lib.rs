//! # fc-03-validator-rotation
//!
//! Deterministic, round-seeded rotation of the active-validator set.
//!
//! Every node must derive the identical forging order for a round from the
//! identical ranked input, with no shared state beyond the round number.
//! The shuffle below is therefore part of the consensus contract: its
//! modulo step is non-uniform on purpose, and changing it to an unbiased
//! Fisher-Yates would hard-fork the network. Do not "fix" it.

use sha2::{Digest, Sha256};
use shared_types::PublicKey;
use std::cmp::Ordering;

/// Total order for ranking validators: descending vote balance, ties
/// broken by ascending public key.
///
/// The tie-break is load-bearing. Two validators with equal stake must
/// rank identically on every node, or their forging orders desync.
pub fn ranking_order(
    a_key: &PublicKey,
    a_balance: u128,
    b_key: &PublicKey,
    b_balance: u128,
) -> Ordering {
    b_balance.cmp(&a_balance).then_with(|| a_key.cmp(b_key))
}

/// Sort `items` into ranking order using the given field accessors.
pub fn rank<T>(
    items: &mut [T],
    key: impl Fn(&T) -> PublicKey,
    balance: impl Fn(&T) -> u128,
) {
    items.sort_by(|a, b| ranking_order(&key(a), balance(a), &key(b), balance(b)));
}

/// Permute the ranked validators into the forging order for `round`.
///
/// Seed is SHA-256 of the decimal round number. Four seed bytes are
/// consumed per hash round; at scan position `i` the element at
/// `i + (byte mod remaining)` is swapped into place. When the four bytes
/// are exhausted before the scan completes, the seed is re-hashed and the
/// walk continues.
///
/// Pure function of `(round, validators)`; the output is a permutation of
/// the input.
pub fn shuffle_for_round<T>(round: u64, mut validators: Vec<T>) -> Vec<T> {
    let count = validators.len();
    if count < 2 {
        return validators;
    }

    let mut seed: [u8; 32] = Sha256::digest(round.to_string().as_bytes()).into();
    let mut i = 0usize;
    while i < count {
        for x in 0..4 {
            if i >= count {
                break;
            }
            let remaining = count - i;
            let j = i + (seed[x] as usize) % remaining;
            validators.swap(i, j);
            i += 1;
        }
        seed = Sha256::digest(seed).into();
    }

    validators
}
