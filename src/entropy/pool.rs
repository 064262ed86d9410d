//! Shared evolving entropy pool.
//!
//! A single 32-byte accumulator that every commit and every resolution
//! chains into. Because each update hashes the previous value, the pool
//! links all observations together: the randomness used to resolve one
//! observation depends on every event that happened before it.
//!
//! The pool is seeded once from deployment context and can only move
//! forward through [`EntropyPool::absorb_commit`] and
//! [`EntropyPool::absorb_resolution`]. There is no reset or setter.

use crate::primitives::{Address, Amount, BlockIndex, Hash32};
use sha3::{Digest, Keccak256};

/// Domain separator for pool initialisation.
const GENESIS_DOMAIN: &[u8] = b"superposition-pool-genesis-v1";

/// Domain separator for commit updates.
const COMMIT_DOMAIN: &[u8] = b"superposition-pool-commit-v1";

/// Domain separator for resolution updates.
const RESOLUTION_DOMAIN: &[u8] = b"superposition-pool-resolve-v1";

/// Startup context used to seed the pool.
#[derive(Debug, Clone)]
pub struct GenesisContext {
    /// Timestamp of the deployment block.
    pub timestamp: u64,
    /// Index of the deployment block.
    pub block_index: BlockIndex,
    /// Oracle mix-in of the deployment block.
    pub mix_in: Hash32,
    /// Identity that deployed the controller.
    pub deployer: Address,
    /// Addresses of the controller and its ledgers.
    pub components: Vec<Address>,
}

/// Event data absorbed on commit.
#[derive(Debug, Clone, Copy)]
pub struct CommitMix {
    /// Committing account.
    pub account: Address,
    /// Escrowed amount.
    pub amount: Amount,
    /// Committed reveal-data hash.
    pub data_hash: Hash32,
    /// Committed entropy hash.
    pub entropy_hash: Hash32,
    /// Block of the commit.
    pub block_index: BlockIndex,
    /// Timestamp of the commit block.
    pub timestamp: u64,
}

/// Event data absorbed on reveal or force-reveal.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionMix {
    /// Account whose observation was resolved.
    pub account: Address,
    /// Amount minted to outcome A.
    pub outcome_a: Amount,
    /// Amount minted to outcome B.
    pub outcome_b: Amount,
    /// Randomness the resolution used.
    pub randomness: Hash32,
    /// Block of the resolution.
    pub block_index: BlockIndex,
}

/// Before/after values of a single pool transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolUpdate {
    /// Value before the update.
    pub previous: Hash32,
    /// Value after the update.
    pub current: Hash32,
}

/// Process-wide evolving entropy accumulator.
///
/// Owned by the observation registry so independent registries (and
/// test harnesses) never share state.
#[derive(Debug, Clone)]
pub struct EntropyPool {
    /// Current accumulator value.
    value: Hash32,
    /// Total updates since genesis.
    updates: u64,
}

impl EntropyPool {
    /// Seeds a new pool from deployment context.
    pub fn genesis(ctx: &GenesisContext) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(GENESIS_DOMAIN);
        hasher.update(ctx.timestamp.to_be_bytes());
        hasher.update(ctx.block_index.to_be_bytes());
        hasher.update(ctx.mix_in.as_bytes());
        hasher.update(ctx.deployer.as_bytes());
        for component in &ctx.components {
            hasher.update(component.as_bytes());
        }

        let value = Hash32(hasher.finalize().into());
        tracing::info!(block_index = ctx.block_index, pool = %value, "Entropy pool seeded");

        Self { value, updates: 0 }
    }

    /// Returns the current pool value.
    #[inline]
    pub fn current(&self) -> Hash32 {
        self.value
    }

    /// Returns the number of updates applied since genesis.
    #[inline]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Chains a commit into the pool.
    pub fn absorb_commit(&mut self, mix: &CommitMix) -> PoolUpdate {
        let mut hasher = Keccak256::new();
        hasher.update(COMMIT_DOMAIN);
        hasher.update(self.value.as_bytes());
        hasher.update(mix.account.as_bytes());
        hasher.update(mix.amount.to_be_bytes());
        hasher.update(mix.data_hash.as_bytes());
        hasher.update(mix.entropy_hash.as_bytes());
        hasher.update(mix.block_index.to_be_bytes());
        hasher.update(mix.timestamp.to_be_bytes());
        self.advance(Hash32(hasher.finalize().into()))
    }

    /// Chains a resolution outcome into the pool.
    pub fn absorb_resolution(&mut self, mix: &ResolutionMix) -> PoolUpdate {
        let mut hasher = Keccak256::new();
        hasher.update(RESOLUTION_DOMAIN);
        hasher.update(self.value.as_bytes());
        hasher.update(mix.account.as_bytes());
        hasher.update(mix.outcome_a.to_be_bytes());
        hasher.update(mix.outcome_b.to_be_bytes());
        hasher.update(mix.randomness.as_bytes());
        hasher.update(mix.block_index.to_be_bytes());
        self.advance(Hash32(hasher.finalize().into()))
    }

    /// Undoes `update` if it is still the latest one. Used only to unwind
    /// an operation that failed after advancing the pool.
    pub(crate) fn revert(&mut self, update: &PoolUpdate) {
        if self.value == update.current && self.updates > 0 {
            self.value = update.previous;
            self.updates -= 1;
        }
    }

    fn advance(&mut self, next: Hash32) -> PoolUpdate {
        let update = PoolUpdate {
            previous: self.value,
            current: next,
        };
        self.value = next;
        self.updates += 1;

        tracing::debug!(
            updates = self.updates,
            previous = %update.previous,
            current = %update.current,
            "Entropy pool advanced"
        );

        update
    }
}
