//! Observation lifecycle errors.

use crate::ledger::LedgerError;
use crate::primitives::{Address, Amount, BlockIndex};
use thiserror::Error;

/// Errors that can occur during commit, reveal, force-reveal or cancel.
///
/// Every error leaves the registry, the pool and the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    // State conflicts
    #[error("account {0} already has a pending observation")]
    AlreadyPending(Address),
    #[error("account {0} has no pending observation")]
    NoPending(Address),

    // Input validation
    #[error("amount must be non-zero")]
    ZeroAmount,
    #[error("amount {amount} exceeds maximum {max}")]
    AmountTooLarge { amount: Amount, max: Amount },
    #[error("entropy is zero or does not match the commitment")]
    ZeroEntropy,
    #[error("reveal data is {len} bytes, maximum is {max}")]
    DataTooLarge { len: usize, max: usize },

    // Timing
    #[error("too early to reveal: allowed from block {allowed_from}")]
    TooEarly { allowed_from: BlockIndex },
    #[error("grace period not passed: force reveal allowed from block {allowed_from}")]
    GraceNotPassed { allowed_from: BlockIndex },
    #[error("reveal window closed after block {closed_after}")]
    WindowClosed { closed_after: BlockIndex },
    #[error("reveal window still open: cancel allowed from block {allowed_from}")]
    WindowStillOpen { allowed_from: BlockIndex },

    // Data integrity
    #[error("revealed data does not match the committed hash")]
    DataMismatch,

    // Source exhaustion
    #[error("randomness source for block {0} has expired")]
    SourceExpired(BlockIndex),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
