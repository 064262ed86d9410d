//! Host-backed block oracle.
//!
//! Models a chain that seals one block at a time. Each sealed block's
//! hash is derived with BLAKE3 from its parent hash, height, mix-in and a
//! chain seed. Mix-ins come from a ChaCha20 stream, the way a beacon
//! would hand out fresh randomness per block. Only the most recent
//! `retention` hashes are remembered.

use super::{within_retention, BlockOracle};
use crate::config::{ConfigError, SimulationConfig};
use crate::primitives::{BlockIndex, Hash32};
use blake3::Hasher;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use std::collections::VecDeque;

/// Domain separator for sealed block hashes.
const BLOCK_DOMAIN: &[u8] = b"superposition-simulated-block-v1";

/// A simulated chain acting as the host block oracle.
pub struct SimulatedChain {
    chain_id: u64,
    /// Index of the block currently executing.
    height: BlockIndex,
    /// Timestamp of the current block.
    time: DateTime<Utc>,
    block_time: TimeDelta,
    /// Mix-in of the current block.
    mix_in: Hash32,
    /// Sealed block hashes, oldest first.
    sealed: VecDeque<(BlockIndex, Hash32)>,
    retention: u64,
    seed: [u8; 32],
    beacon: ChaCha20Rng,
}

impl SimulatedChain {
    /// Creates a chain at height 1 with a fixed seed.
    pub fn with_seed(config: &SimulationConfig, retention: u64, seed: [u8; 32]) -> Self {
        let mut beacon = ChaCha20Rng::from_seed(seed);
        let mix_in = next_mix_in(&mut beacon);
        let time = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let mut chain = Self {
            chain_id: config.chain_id,
            height: 0,
            time,
            block_time: TimeDelta::try_seconds(i64::from(config.block_time_secs.max(1)))
                .unwrap_or_else(TimeDelta::zero),
            mix_in,
            sealed: VecDeque::new(),
            retention,
            seed,
            beacon,
        };
        // Seal the genesis block so `blockhash(0)` exists.
        chain.advance(1);
        chain
    }

    /// Creates a chain seeded from the OS entropy source.
    pub fn from_os_entropy(config: &SimulationConfig, retention: u64) -> Self {
        let mut seed = [0u8; 32];
        rand_core::OsRng.fill_bytes(&mut seed);
        Self::with_seed(config, retention, seed)
    }

    /// Creates a chain from a simulation config, using its hex seed when
    /// present.
    pub fn from_config(config: &SimulationConfig, retention: u64) -> Result<Self, ConfigError> {
        match &config.seed {
            Some(hex) => Ok(Self::with_seed(config, retention, parse_seed(hex)?)),
            None => Ok(Self::from_os_entropy(config, retention)),
        }
    }

    /// Seals the current block and moves to the next one, `blocks` times.
    pub fn advance(&mut self, blocks: u64) {
        for _ in 0..blocks {
            let parent = self.sealed.back().map(|(_, h)| *h).unwrap_or_default();

            let mut hasher = Hasher::new();
            hasher.update(BLOCK_DOMAIN);
            hasher.update(&self.seed);
            hasher.update(parent.as_bytes());
            hasher.update(&self.height.to_be_bytes());
            hasher.update(self.mix_in.as_bytes());
            let hash = Hash32(*hasher.finalize().as_bytes());

            self.sealed.push_back((self.height, hash));
            while self.sealed.len() as u64 > self.retention {
                self.sealed.pop_front();
            }

            self.height += 1;
            self.time = self
                .time
                .checked_add_signed(self.block_time)
                .unwrap_or(self.time);
            self.mix_in = next_mix_in(&mut self.beacon);
        }

        tracing::trace!(height = self.height, sealed = self.sealed.len(), "Chain advanced");
    }
}

impl BlockOracle for SimulatedChain {
    fn current_index(&self) -> BlockIndex {
        self.height
    }

    fn timestamp(&self) -> u64 {
        u64::try_from(self.time.timestamp()).unwrap_or(0)
    }

    fn mix_in(&self) -> Hash32 {
        self.mix_in
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn blockhash(&self, index: BlockIndex) -> Option<Hash32> {
        if !within_retention(self.height, index, self.retention) {
            return None;
        }
        let (oldest, _) = *self.sealed.front()?;
        let offset = usize::try_from(index.checked_sub(oldest)?).ok()?;
        self.sealed.get(offset).map(|(_, h)| *h)
    }
}

fn next_mix_in(beacon: &mut ChaCha20Rng) -> Hash32 {
    let mut bytes = [0u8; 32];
    beacon.fill_bytes(&mut bytes);
    Hash32(bytes)
}

fn parse_seed(hex: &str) -> Result<[u8; 32], ConfigError> {
    let hex = hex.trim_start_matches("0x");
    if hex.len() != 64 || !hex.is_ascii() {
        return Err(ConfigError::InvalidSeed(format!(
            "expected 64 hex characters, got {}",
            hex.len()
        )));
    }
    let mut seed = [0u8; 32];
    for (i, byte) in seed.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| ConfigError::InvalidSeed(e.to_string()))?;
    }
    Ok(seed)
}
