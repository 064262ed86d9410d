//! Observation lifecycle.
//!
//! An account escrows part of its superposed balance with a commitment to
//! some reveal data and a secret. After a short delay the account (or,
//! after a grace period, anyone) reveals, and the escrow collapses wholly
//! into one of the two outcome balances. If the reveal window passes
//! unused, the account cancels and gets the escrow back.

mod error;
mod pending;
mod registry;
mod status;

pub use error::ObservationError;
pub use pending::PendingObservation;
pub use registry::{Cancellation, CommitReceipt, ObservationRegistry, Resolution};
pub use status::ObservationStatus;
