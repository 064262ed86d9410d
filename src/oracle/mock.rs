//! Deterministic block oracle for tests.

use super::{within_retention, BlockOracle};
use crate::config::BLOCKHASH_RETENTION;
use crate::primitives::{BlockIndex, Hash32};
use std::collections::{BTreeSet, HashMap};

/// Mock oracle with fully controllable block state.
///
/// Block hashes are a deterministic function of the index unless
/// overridden, and individual hashes can be expired early to simulate a
/// host that has forgotten them.
#[derive(Debug, Clone)]
pub struct MockOracle {
    index: BlockIndex,
    timestamp: u64,
    mix_in: Hash32,
    chain_id: u64,
    retention: u64,
    expired: BTreeSet<BlockIndex>,
    overrides: HashMap<BlockIndex, Hash32>,
}

impl MockOracle {
    /// Seconds added to the timestamp per block.
    pub const BLOCK_TIME: u64 = 12;

    /// Creates an oracle positioned at `index`.
    pub fn at(index: BlockIndex) -> Self {
        Self {
            index,
            timestamp: 1_700_000_000 + index * Self::BLOCK_TIME,
            mix_in: Self::default_mix_in(index),
            chain_id: 1,
            retention: BLOCKHASH_RETENTION,
            expired: BTreeSet::new(),
            overrides: HashMap::new(),
        }
    }

    /// Moves forward `blocks` blocks.
    pub fn advance(&mut self, blocks: u64) {
        self.index += blocks;
        self.timestamp += blocks * Self::BLOCK_TIME;
        self.mix_in = Self::default_mix_in(self.index);
    }

    /// Jumps to `index` (forward only).
    pub fn advance_to(&mut self, index: BlockIndex) {
        if index > self.index {
            self.advance(index - self.index);
        }
    }

    /// Overrides the current block's mix-in.
    pub fn set_mix_in(&mut self, mix_in: Hash32) {
        self.mix_in = mix_in;
    }

    /// Overrides the chain identifier.
    pub fn set_chain_id(&mut self, chain_id: u64) {
        self.chain_id = chain_id;
    }

    /// Overrides the hash reported for a block.
    pub fn set_blockhash(&mut self, index: BlockIndex, hash: Hash32) {
        self.overrides.insert(index, hash);
    }

    /// Makes a block's hash unretrievable regardless of its age.
    pub fn expire(&mut self, index: BlockIndex) {
        self.expired.insert(index);
    }

    fn default_mix_in(index: BlockIndex) -> Hash32 {
        let mut bytes = [0x5au8; 32];
        bytes[24..].copy_from_slice(&index.to_be_bytes());
        Hash32(bytes)
    }

    fn default_blockhash(index: BlockIndex) -> Hash32 {
        let mut bytes = [0xb1u8; 32];
        bytes[24..].copy_from_slice(&index.to_be_bytes());
        Hash32(bytes)
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::at(1_000)
    }
}

impl BlockOracle for MockOracle {
    fn current_index(&self) -> BlockIndex {
        self.index
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn mix_in(&self) -> Hash32 {
        self.mix_in
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn blockhash(&self, index: BlockIndex) -> Option<Hash32> {
        if self.expired.contains(&index) || !within_retention(self.index, index, self.retention) {
            return None;
        }
        Some(
            self.overrides
                .get(&index)
                .copied()
                .unwrap_or_else(|| Self::default_blockhash(index)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_oracle_lifecycle() {
        let mut oracle = MockOracle::at(10);
        assert_eq!(oracle.current_index(), 10);
        assert!(oracle.blockhash(10).is_none());
        assert!(oracle.blockhash(9).is_some());

        let t0 = oracle.timestamp();
        oracle.advance(2);
        assert_eq!(oracle.current_index(), 12);
        assert_eq!(oracle.timestamp(), t0 + 24);
        assert!(oracle.blockhash(10).is_some());
    }

    #[test]
    fn test_manual_expiry() {
        let mut oracle = MockOracle::at(50);
        assert!(oracle.blockhash(40).is_some());
        oracle.expire(40);
        assert!(oracle.blockhash(40).is_none());
        assert!(oracle.blockhash(41).is_some());
    }

    #[test]
    fn test_retention_expiry() {
        let mut oracle = MockOracle::at(10);
        oracle.advance_to(10 + 256);
        assert!(oracle.blockhash(10).is_some());
        oracle.advance(1);
        assert!(oracle.blockhash(10).is_none());
    }

    #[test]
    fn test_overrides() {
        let mut oracle = MockOracle::at(10);
        oracle.set_blockhash(5, Hash32::from_low_u64(77));
        assert_eq!(oracle.blockhash(5), Some(Hash32::from_low_u64(77)));
    }
}
