//! Deterministic deck shuffle.
//!
//! Maps a 256-bit seed to a permutation of the 52 canonical card indices.
//! The permutation is what the fairness verifier replays, so the recurrence is
//! fixed: a running 256-bit accumulator starts at the seed and is re-hashed
//! with the loop counter at every Fisher-Yates step. Re-hashing the original
//! seed instead of the accumulator would produce a different (and wrong) deck.

use sha3::{Digest, Keccak256};

use crate::fairness::Seed;

/// Shuffle the 52 canonical card indices with a seeded Fisher-Yates walk.
///
/// Pure and total: the same seed always yields the same permutation.
///
/// Per step `i` (from 51 down to 1): `acc = keccak256(acc || be256(i))`,
/// `j = acc mod (i + 1)`, swap positions `i` and `j`. The loop counter is
/// encoded as a 32-byte big-endian word so the byte stream matches an EVM
/// `abi.encodePacked(bytes32, uint256)` replay.
pub fn shuffle(seed: &Seed) -> [u8; 52] {
    let mut deck = [0u8; 52];
    for (i, slot) in deck.iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut acc: [u8; 32] = seed.to_bytes();
    for i in (1..52usize).rev() {
        let mut hasher = Keccak256::new();
        hasher.update(acc);
        hasher.update(be256(i as u64));
        acc = hasher.finalize().into();
        let j = mod_u256(&acc, (i + 1) as u64) as usize;
        deck.swap(i, j);
    }
    deck
}

/// 32-byte big-endian encoding of a u64 (an EVM uint256 word).
fn be256(v: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&v.to_be_bytes());
    out
}

/// Remainder of a 256-bit big-endian integer modulo a small divisor.
fn mod_u256(bytes: &[u8; 32], m: u64) -> u64 {
    debug_assert!(m > 0);
    let mut r: u128 = 0;
    for &b in bytes {
        r = ((r << 8) | b as u128) % m as u128;
    }
    r as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let deck = shuffle(&Seed::from_bytes([7u8; 32]));
        let mut seen = [false; 52];
        for &c in &deck {
            assert!(c < 52);
            assert!(!seen[c as usize], "duplicate card index {c}");
            seen[c as usize] = true;
        }
    }

    #[test]
    fn shuffle_is_deterministic() {
        let seed = Seed::from_bytes([0xAB; 32]);
        assert_eq!(shuffle(&seed), shuffle(&seed));
    }

    #[test]
    fn different_seeds_give_different_orders() {
        let a = shuffle(&Seed::from_bytes([1u8; 32]));
        let b = shuffle(&Seed::from_bytes([2u8; 32]));
        assert_ne!(a, b);
    }

    #[test]
    fn zero_seed_still_permutes() {
        let deck = shuffle(&Seed::from_bytes([0u8; 32]));
        let mut sorted = deck;
        sorted.sort_unstable();
        let identity: Vec<u8> = (0..52).collect();
        assert_eq!(sorted.to_vec(), identity);
        // The hash chain moves cards even for the all-zero seed.
        assert_ne!(deck.to_vec(), identity);
    }

    #[test]
    fn mod_u256_matches_small_values() {
        let mut b = [0u8; 32];
        b[31] = 250;
        assert_eq!(mod_u256(&b, 52), 250 % 52);
        b[30] = 1; // 256 + 250 = 506
        assert_eq!(mod_u256(&b, 52), 506 % 52);
        assert_eq!(mod_u256(&[0xFF; 32], 1), 0);
    }
}
