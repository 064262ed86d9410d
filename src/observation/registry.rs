//! Commit / reveal / force-reveal / cancel state machine.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --commit--> Committed --reveal | force_reveal--> Observed
//!                            \--cancel (after expiry)--> Cancelled
//! ```
//!
//! Every operation validates all of its preconditions before touching
//! any state. Registry state (the pending record, the pool) is written
//! before the ledger is called, and is unwound if that call fails, so an
//! operation either takes full effect or none.

use super::error::ObservationError;
use super::pending::PendingObservation;
use super::status::Timing;
use crate::config::{ConfigError, ProtocolConfig};
use crate::entropy::{
    binary_collapse, combine, entropy_commitment, keccak, CommitMix, EntropyPool, MixInputs,
    PoolUpdate, ResolutionMix,
};
use crate::ledger::{Ledger, Token};
use crate::oracle::BlockOracle;
use crate::primitives::{Address, Amount, BlockIndex, Hash32};
use std::collections::HashMap;

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Committing account.
    pub account: Address,
    /// The stored record.
    pub observation: PendingObservation,
    /// Pool transition caused by the commit.
    pub pool_update: PoolUpdate,
}

/// Result of a successful reveal or force-reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Account that owned the observation and received the outcome.
    pub account: Address,
    /// Caller that submitted the resolution.
    pub revealer: Address,
    /// True when resolved through `force_reveal`.
    pub forced: bool,
    /// Escrowed amount that was resolved.
    pub amount: Amount,
    /// Amount minted to outcome A.
    pub outcome_a: Amount,
    /// Amount minted to outcome B.
    pub outcome_b: Amount,
    /// Combined randomness the decision was drawn from.
    pub randomness: Hash32,
    /// Block at which the resolution executed.
    pub block_index: BlockIndex,
    /// Pool transition caused by the resolution.
    pub pool_update: PoolUpdate,
}

/// Result of a successful cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancellation {
    /// Account whose observation was cancelled.
    pub account: Address,
    /// Amount returned to the superposed balance.
    pub amount: Amount,
    /// Commit block of the cancelled observation.
    pub ref_block: BlockIndex,
}

/// Per-account pending observations plus the shared entropy pool.
#[derive(Debug, Clone)]
pub struct ObservationRegistry {
    config: ProtocolConfig,
    /// Identity presented to the ledger for mint/burn.
    authority: Address,
    pool: EntropyPool,
    pending: HashMap<Address, PendingObservation>,
}

impl ObservationRegistry {
    /// Creates a registry after validating `config`.
    pub fn new(
        config: ProtocolConfig,
        authority: Address,
        pool: EntropyPool,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            authority,
            pool,
            pending: HashMap::new(),
        })
    }

    /// Returns the protocol configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Returns the entropy pool.
    pub fn pool(&self) -> &EntropyPool {
        &self.pool
    }

    /// Returns the pending observation of `account`, if any.
    pub fn pending(&self, account: &Address) -> Option<&PendingObservation> {
        self.pending.get(account)
    }

    /// Number of accounts with a pending observation.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Escrows `amount` of the caller's superposed balance against a
    /// commitment to `data_hash` and `user_entropy`.
    pub fn commit<L: Ledger, O: BlockOracle>(
        &mut self,
        ledger: &mut L,
        oracle: &O,
        caller: &Address,
        amount: Amount,
        data_hash: Hash32,
        user_entropy: Hash32,
    ) -> Result<CommitReceipt, ObservationError> {
        if self.pending.contains_key(caller) {
            return Err(ObservationError::AlreadyPending(*caller));
        }
        if amount == 0 {
            return Err(ObservationError::ZeroAmount);
        }
        if amount > self.config.max_observe_amount {
            return Err(ObservationError::AmountTooLarge {
                amount,
                max: self.config.max_observe_amount,
            });
        }
        if user_entropy.is_zero() {
            return Err(ObservationError::ZeroEntropy);
        }

        let user_entropy_hash = entropy_commitment(&user_entropy);
        let block_index = oracle.current_index();

        let pool_update = self.pool.absorb_commit(&CommitMix {
            account: *caller,
            amount,
            data_hash,
            entropy_hash: user_entropy_hash,
            block_index,
            timestamp: oracle.timestamp(),
        });
        let observation = PendingObservation {
            amount,
            data_hash,
            user_entropy_hash,
            entropy_snapshot: pool_update.current,
            ref_block: block_index,
        };
        self.pending.insert(*caller, observation);

        if let Err(e) = ledger.burn(&self.authority, Token::Superposed, caller, amount) {
            self.pending.remove(caller);
            self.pool.revert(&pool_update);
            return Err(e.into());
        }

        tracing::info!(
            account = %caller,
            amount,
            ref_block = block_index,
            data_hash = %data_hash,
            "Observation committed"
        );

        Ok(CommitReceipt {
            account: *caller,
            observation,
            pool_update,
        })
    }

    /// Resolves the caller's own observation.
    pub fn reveal<L: Ledger, O: BlockOracle>(
        &mut self,
        ledger: &mut L,
        oracle: &O,
        caller: &Address,
        data: &[u8],
        user_entropy: Hash32,
    ) -> Result<Resolution, ObservationError> {
        self.resolve(ledger, oracle, caller, caller, data, user_entropy, false)
    }

    /// Resolves another account's observation once the grace period has
    /// passed. The outcome is identical to the owner revealing at the same
    /// block; it is minted to `account`, not to the caller.
    pub fn force_reveal<L: Ledger, O: BlockOracle>(
        &mut self,
        ledger: &mut L,
        oracle: &O,
        caller: &Address,
        account: &Address,
        data: &[u8],
        user_entropy: Hash32,
    ) -> Result<Resolution, ObservationError> {
        self.resolve(ledger, oracle, caller, account, data, user_entropy, true)
    }

    /// Returns an expired observation's escrow to the superposed balance.
    pub fn cancel<L: Ledger, O: BlockOracle>(
        &mut self,
        ledger: &mut L,
        oracle: &O,
        caller: &Address,
    ) -> Result<Cancellation, ObservationError> {
        let record = *self
            .pending
            .get(caller)
            .ok_or(ObservationError::NoPending(*caller))?;
        let timing = Timing::of(&self.config, record.ref_block);
        if !timing.closed(oracle.current_index()) {
            return Err(ObservationError::WindowStillOpen {
                allowed_from: timing.closes_at.saturating_add(1),
            });
        }

        self.pending.remove(caller);
        if let Err(e) = ledger.mint(&self.authority, Token::Superposed, caller, record.amount) {
            self.pending.insert(*caller, record);
            return Err(e.into());
        }

        tracing::info!(
            account = %caller,
            amount = record.amount,
            ref_block = record.ref_block,
            "Observation cancelled"
        );

        Ok(Cancellation {
            account: *caller,
            amount: record.amount,
            ref_block: record.ref_block,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve<L: Ledger, O: BlockOracle>(
        &mut self,
        ledger: &mut L,
        oracle: &O,
        revealer: &Address,
        account: &Address,
        data: &[u8],
        user_entropy: Hash32,
        forced: bool,
    ) -> Result<Resolution, ObservationError> {
        let record = *self
            .pending
            .get(account)
            .ok_or(ObservationError::NoPending(*account))?;
        let timing = Timing::of(&self.config, record.ref_block);
        let now = oracle.current_index();

        if forced {
            if !timing.force_open(now) {
                return Err(ObservationError::GraceNotPassed {
                    allowed_from: timing.force_blocked_until.saturating_add(1),
                });
            }
        } else if !timing.reveal_open(now) {
            return Err(ObservationError::TooEarly {
                allowed_from: timing.reveal_blocked_until.saturating_add(1),
            });
        }
        if timing.closed(now) {
            return Err(ObservationError::WindowClosed {
                closed_after: timing.closes_at,
            });
        }
        if entropy_commitment(&user_entropy) != record.user_entropy_hash {
            return Err(ObservationError::ZeroEntropy);
        }
        if data.len() > self.config.data_max {
            return Err(ObservationError::DataTooLarge {
                len: data.len(),
                max: self.config.data_max,
            });
        }
        if keccak(data) != record.data_hash {
            return Err(ObservationError::DataMismatch);
        }
        let commit_linked_randomness = oracle
            .blockhash(timing.source_index)
            .ok_or(ObservationError::SourceExpired(timing.source_index))?;

        // The record goes before any ledger call.
        self.pending.remove(account);

        let recent_block_randomness = oracle.blockhash(now.saturating_sub(1)).unwrap_or_default();
        let randomness = combine(&MixInputs {
            commit_linked_randomness,
            current_mix_in: oracle.mix_in(),
            recent_block_randomness,
            timestamp: oracle.timestamp(),
            block_index: now,
            chain_id: oracle.chain_id(),
            account: *account,
            user_entropy,
            data_hash: record.data_hash,
            ref_block: record.ref_block,
            entropy_snapshot: record.entropy_snapshot,
            current_pool: self.pool.current(),
        });
        let (outcome_a, outcome_b) =
            binary_collapse(record.amount, &randomness, &record.data_hash, &user_entropy);

        let (token, minted) = if outcome_a > 0 {
            (Token::OutcomeA, outcome_a)
        } else {
            (Token::OutcomeB, outcome_b)
        };
        if let Err(e) = ledger.mint(&self.authority, token, account, minted) {
            self.pending.insert(*account, record);
            return Err(e.into());
        }

        let pool_update = self.pool.absorb_resolution(&ResolutionMix {
            account: *account,
            outcome_a,
            outcome_b,
            randomness,
            block_index: now,
        });

        tracing::info!(
            account = %account,
            revealer = %revealer,
            forced,
            amount = record.amount,
            outcome_a,
            outcome_b,
            "Observation collapsed"
        );

        Ok(Resolution {
            account: *account,
            revealer: *revealer,
            forced,
            amount: record.amount,
            outcome_a,
            outcome_b,
            randomness,
            block_index: now,
            pool_update,
        })
    }
}
