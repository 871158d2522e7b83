//! Commit-reveal verification.

use solana_program::hash::{hash, hashv};

/// Domain tag mixed into the preimage when deriving the revealed randomness,
/// so the randomness cannot be read off the public commitment.
pub const RANDOMNESS_DOMAIN: &[u8] = b"commit-raffle:randomness";

/// 256-bit digest used by commitments.
pub trait CommitmentHasher {
    fn hash(&self, data: &[u8]) -> [u8; 32];

    fn hash_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        self.hash(&parts.concat())
    }
}

/// SHA-256, the digest clients use to publish commitments.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl CommitmentHasher for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        hash(data).to_bytes()
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        hashv(parts).to_bytes()
    }
}

pub fn verify_opening<H: CommitmentHasher>(
    hasher: &H,
    commitment: &[u8; 32],
    preimage: &[u8],
) -> bool {
    hasher.hash(preimage) == *commitment
}

/// Randomness revealed by a valid opening.
pub fn derive_randomness<H: CommitmentHasher>(hasher: &H, preimage: &[u8]) -> [u8; 32] {
    hasher.hash_parts(&[RANDOMNESS_DOMAIN, preimage])
}
