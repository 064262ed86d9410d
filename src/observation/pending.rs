//! Pending observation record.

use crate::primitives::{Amount, BlockIndex, Hash32};

/// An escrowed, not yet resolved observation.
///
/// At most one exists per account. It is created whole by commit and
/// removed whole by reveal, force-reveal or cancel; it is never edited
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingObservation {
    /// Escrowed superposed amount. Always non-zero for a live record.
    pub amount: Amount,
    /// Hash of the data that must be revealed.
    pub data_hash: Hash32,
    /// Hash of the caller's secret entropy. The secret itself is never
    /// stored.
    pub user_entropy_hash: Hash32,
    /// Pool value immediately after this commit.
    pub entropy_snapshot: Hash32,
    /// Block index at commit time.
    pub ref_block: BlockIndex,
}
