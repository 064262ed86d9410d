//! Read-only timing projections.
//!
//! Every window boundary used by the registry's operations is computed
//! here, so a `can_*` query and the matching operation always agree.
//!
//! Offsets are measured from the commit block `r`:
//!
//! ```text
//! r ........ r+delay | r+delay+1 .. r+delay+grace | .. r+window | r+window+1 ..
//!   too early        | reveal only                | + force    | cancel only
//! ```

use super::pending::PendingObservation;
use super::registry::ObservationRegistry;
use crate::config::ProtocolConfig;
use crate::oracle::BlockOracle;
use crate::primitives::{Address, Amount, BlockIndex};

/// Window boundaries for one pending observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timing {
    /// Last block at which reveal is still too early.
    pub reveal_blocked_until: BlockIndex,
    /// Last block at which force-reveal is still blocked.
    pub force_blocked_until: BlockIndex,
    /// Last block at which reveal and force-reveal are allowed.
    pub closes_at: BlockIndex,
    /// Block whose hash seeds the resolution.
    pub source_index: BlockIndex,
}

impl Timing {
    pub fn of(config: &ProtocolConfig, ref_block: BlockIndex) -> Self {
        let source_index = ref_block.saturating_add(config.reveal_delay);
        Self {
            reveal_blocked_until: source_index,
            force_blocked_until: ref_block.saturating_add(config.force_offset()),
            closes_at: ref_block.saturating_add(config.max_reveal_window),
            source_index,
        }
    }

    #[inline]
    pub fn reveal_open(&self, now: BlockIndex) -> bool {
        now > self.reveal_blocked_until
    }

    #[inline]
    pub fn force_open(&self, now: BlockIndex) -> bool {
        now > self.force_blocked_until
    }

    #[inline]
    pub fn closed(&self, now: BlockIndex) -> bool {
        now > self.closes_at
    }
}

/// Blocks from `now` until the first block after `boundary`.
#[inline]
fn blocks_after(boundary: BlockIndex, now: BlockIndex) -> u64 {
    boundary.saturating_add(1).saturating_sub(now)
}

/// Snapshot of an account's observation timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationStatus {
    /// Escrowed amount, zero when nothing is pending.
    pub pending_amount: Amount,
    /// Commit block, when pending.
    pub ref_block: Option<BlockIndex>,
    /// The block used for the query.
    pub current_block: BlockIndex,
    /// Reveal would pass its timing and source checks now.
    pub can_reveal: bool,
    /// Force-reveal would pass its timing and source checks now.
    pub can_force_reveal: bool,
    /// Cancel would succeed now.
    pub can_cancel: bool,
    /// Blocks until reveal opens (0 once open).
    pub blocks_until_reveal: Option<u64>,
    /// Blocks until force-reveal opens (0 once open).
    pub blocks_until_force_reveal: Option<u64>,
    /// Blocks until the window closes and cancel opens (0 once closed).
    pub blocks_until_expiry: Option<u64>,
    /// The commit-linked block hash is retrievable now.
    pub source_available: bool,
}

impl ObservationRegistry {
    fn timing_for<O: BlockOracle>(
        &self,
        oracle: &O,
        account: &Address,
    ) -> Option<(PendingObservation, Timing, BlockIndex)> {
        let pending = *self.pending(account)?;
        Some((
            pending,
            Timing::of(self.config(), pending.ref_block),
            oracle.current_index(),
        ))
    }

    /// Whether the commit-linked block hash can be read right now.
    pub fn source_available<O: BlockOracle>(&self, oracle: &O, account: &Address) -> bool {
        self.timing_for(oracle, account)
            .map(|(_, timing, _)| oracle.blockhash(timing.source_index).is_some())
            .unwrap_or(false)
    }

    /// Whether `reveal` would pass every timing and source check.
    pub fn can_reveal<O: BlockOracle>(&self, oracle: &O, account: &Address) -> bool {
        match self.timing_for(oracle, account) {
            Some((_, timing, now)) => {
                timing.reveal_open(now)
                    && !timing.closed(now)
                    && oracle.blockhash(timing.source_index).is_some()
            }
            None => false,
        }
    }

    /// Whether `force_reveal` would pass every timing and source check.
    pub fn can_force_reveal<O: BlockOracle>(&self, oracle: &O, account: &Address) -> bool {
        match self.timing_for(oracle, account) {
            Some((_, timing, now)) => {
                timing.force_open(now)
                    && !timing.closed(now)
                    && oracle.blockhash(timing.source_index).is_some()
            }
            None => false,
        }
    }

    /// Whether `cancel` would succeed.
    pub fn can_cancel<O: BlockOracle>(&self, oracle: &O, account: &Address) -> bool {
        self.timing_for(oracle, account)
            .map(|(_, timing, now)| timing.closed(now))
            .unwrap_or(false)
    }

    /// Blocks remaining until reveal opens.
    pub fn blocks_until_reveal<O: BlockOracle>(
        &self,
        oracle: &O,
        account: &Address,
    ) -> Option<u64> {
        self.timing_for(oracle, account)
            .map(|(_, timing, now)| blocks_after(timing.reveal_blocked_until, now))
    }

    /// Blocks remaining until force-reveal opens.
    pub fn blocks_until_force_reveal<O: BlockOracle>(
        &self,
        oracle: &O,
        account: &Address,
    ) -> Option<u64> {
        self.timing_for(oracle, account)
            .map(|(_, timing, now)| blocks_after(timing.force_blocked_until, now))
    }

    /// Blocks remaining until the reveal window closes and cancel opens.
    pub fn blocks_until_expiry<O: BlockOracle>(
        &self,
        oracle: &O,
        account: &Address,
    ) -> Option<u64> {
        self.timing_for(oracle, account)
            .map(|(_, timing, now)| blocks_after(timing.closes_at, now))
    }

    /// Full timing snapshot for an account.
    pub fn status<O: BlockOracle>(&self, oracle: &O, account: &Address) -> ObservationStatus {
        ObservationStatus {
            pending_amount: self.pending(account).map(|p| p.amount).unwrap_or(0),
            ref_block: self.pending(account).map(|p| p.ref_block),
            current_block: oracle.current_index(),
            can_reveal: self.can_reveal(oracle, account),
            can_force_reveal: self.can_force_reveal(oracle, account),
            can_cancel: self.can_cancel(oracle, account),
            blocks_until_reveal: self.blocks_until_reveal(oracle, account),
            blocks_until_force_reveal: self.blocks_until_force_reveal(oracle, account),
            blocks_until_expiry: self.blocks_until_expiry(oracle, account),
            source_available: self.source_available(oracle, account),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_boundaries() {
        let config = ProtocolConfig::default();
        let timing = Timing::of(&config, 100);

        assert!(!timing.reveal_open(105));
        assert!(timing.reveal_open(106));
        assert!(!timing.force_open(169));
        assert!(timing.force_open(170));
        assert!(!timing.closed(355));
        assert!(timing.closed(356));
        assert_eq!(timing.source_index, 105);
    }

    #[test]
    fn test_timing_saturates() {
        let config = ProtocolConfig::default();
        let timing = Timing::of(&config, u64::MAX - 1);
        assert_eq!(timing.closes_at, u64::MAX);
        assert!(!timing.closed(u64::MAX));
    }
}
