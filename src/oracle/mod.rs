//! Block oracle abstraction.
//!
//! The observation registry reads block height, timestamp, the current
//! block's mix-in and recent block hashes through [`BlockOracle`]. The host
//! only remembers a bounded number of recent hashes, which is what makes
//! an observation's commit-linked randomness expire.

mod chain;
mod mock;

pub use chain::SimulatedChain;
pub use mock::MockOracle;

use crate::primitives::{BlockIndex, Hash32};

/// Read access to the host's block-level randomness.
pub trait BlockOracle {
    /// Index of the block currently executing.
    fn current_index(&self) -> BlockIndex;

    /// Timestamp of the current block, in seconds.
    fn timestamp(&self) -> u64;

    /// Beacon-style randomness of the current block.
    fn mix_in(&self) -> Hash32;

    /// Chain identifier.
    fn chain_id(&self) -> u64;

    /// Hash of a sealed block.
    ///
    /// Returns `None` for the current or any future block, and for blocks
    /// that have fallen out of the retention window.
    fn blockhash(&self, index: BlockIndex) -> Option<Hash32>;
}

/// Host retention rule: `index` is retrievable from `current` iff it is
/// strictly in the past and at most `retention` blocks old.
#[inline]
pub(crate) fn within_retention(current: BlockIndex, index: BlockIndex, retention: u64) -> bool {
    index < current && current - index <= retention
}
