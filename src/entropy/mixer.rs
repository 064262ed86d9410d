//! Keccak-256 based randomness mixing and binary collapse.
//!
//! # Mixing Model
//!
//! Randomness for a resolution is derived by hashing together:
//! - The hash of the commit-linked block (`ref_block + reveal_delay`)
//! - The current block's oracle mix-in and the previous block's hash
//! - Block context (timestamp, index, chain id)
//! - Everything the account committed to (entropy, data hash, ref block)
//! - The pool snapshot taken at commit and the pool value at resolution
//!
//! Each hash is prefixed with its own domain tag so no output of this
//! module can collide with a hash computed for another purpose.
//!
//! The amount being observed never enters either hash, so the outcome
//! bit is independent of amount magnitude.

use crate::primitives::{Address, Amount, BlockIndex, Hash32};
use sha3::{Digest, Keccak256};

/// Domain separator for the randomness combination step.
const COMBINE_DOMAIN: &[u8] = b"superposition-combine-v1";

/// Domain separator for the collapse decision.
const COLLAPSE_DOMAIN: &[u8] = b"superposition-collapse-v1";

/// Keccak-256 of arbitrary bytes.
pub fn keccak(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash32(hasher.finalize().into())
}

/// Hash under which a caller's raw entropy is committed.
#[inline]
pub fn entropy_commitment(user_entropy: &Hash32) -> Hash32 {
    keccak(user_entropy.as_bytes())
}

/// Which of the two outcome balances an observation collapsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Decision bit 0.
    A,
    /// Decision bit 1.
    B,
}

impl Outcome {
    /// Maps a decision bit to an outcome.
    #[inline]
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Outcome::A
        } else {
            Outcome::B
        }
    }

    /// Splits `amount` into `(outcome_a, outcome_b)` for this side.
    #[inline]
    pub fn split(self, amount: Amount) -> (Amount, Amount) {
        match self {
            Outcome::A => (amount, 0),
            Outcome::B => (0, amount),
        }
    }
}

/// All inputs to [`combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixInputs {
    /// Hash of the block at `ref_block + reveal_delay`.
    pub commit_linked_randomness: Hash32,
    /// Beacon-style mix-in of the block executing the resolution.
    pub current_mix_in: Hash32,
    /// Hash of the block immediately before the current one.
    pub recent_block_randomness: Hash32,
    /// Timestamp of the current block, in seconds.
    pub timestamp: u64,
    /// Index of the current block.
    pub block_index: BlockIndex,
    /// Chain identifier.
    pub chain_id: u64,
    /// Account whose observation is being resolved.
    pub account: Address,
    /// The raw entropy the account committed to.
    pub user_entropy: Hash32,
    /// Hash of the reveal data committed at commit time.
    pub data_hash: Hash32,
    /// Block index recorded at commit time.
    pub ref_block: BlockIndex,
    /// Pool value captured right after the commit.
    pub entropy_snapshot: Hash32,
    /// Pool value at resolution time.
    pub current_pool: Hash32,
}

/// Combines every randomness source into one value.
///
/// Layout: `KECCAK(domain || linked || mix_in || recent || timestamp ||
/// index || chain_id || account || entropy || data_hash || ref_block ||
/// snapshot || pool)` with integers encoded big-endian.
pub fn combine(inputs: &MixInputs) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(COMBINE_DOMAIN);
    hasher.update(inputs.commit_linked_randomness.as_bytes());
    hasher.update(inputs.current_mix_in.as_bytes());
    hasher.update(inputs.recent_block_randomness.as_bytes());
    hasher.update(inputs.timestamp.to_be_bytes());
    hasher.update(inputs.block_index.to_be_bytes());
    hasher.update(inputs.chain_id.to_be_bytes());
    hasher.update(inputs.account.as_bytes());
    hasher.update(inputs.user_entropy.as_bytes());
    hasher.update(inputs.data_hash.as_bytes());
    hasher.update(inputs.ref_block.to_be_bytes());
    hasher.update(inputs.entropy_snapshot.as_bytes());
    hasher.update(inputs.current_pool.as_bytes());

    let mixed = Hash32(hasher.finalize().into());
    tracing::debug!(
        ref_block = inputs.ref_block,
        block_index = inputs.block_index,
        "Combined resolution randomness"
    );
    mixed
}

/// Derives the single decision bit for a resolution.
pub fn collapse_outcome(mixed: &Hash32, data_hash: &Hash32, user_entropy: &Hash32) -> Outcome {
    let mut hasher = Keccak256::new();
    hasher.update(COLLAPSE_DOMAIN);
    hasher.update(mixed.as_bytes());
    hasher.update(data_hash.as_bytes());
    hasher.update(user_entropy.as_bytes());
    let decision = Hash32(hasher.finalize().into());
    Outcome::from_bit(decision.low_bit())
}

/// Collapses `amount` wholly into one side.
///
/// Bit 0 yields `(amount, 0)`, bit 1 yields `(0, amount)`.
pub fn binary_collapse(
    amount: Amount,
    mixed: &Hash32,
    data_hash: &Hash32,
    user_entropy: &Hash32,
) -> (Amount, Amount) {
    collapse_outcome(mixed, data_hash, user_entropy).split(amount)
}
