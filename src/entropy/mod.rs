//! Entropy mixing and the shared entropy pool.
//!
//! The mixer is a set of pure functions: it combines hash-like inputs
//! into one value and turns that value into a single decision bit. The
//! pool is the one piece of evolving state, chained on every commit and
//! every resolution so that observations depend on each other.

mod mixer;
mod pool;

pub use mixer::{
    binary_collapse, collapse_outcome, combine, entropy_commitment, keccak, MixInputs, Outcome,
};
pub use pool::{CommitMix, EntropyPool, GenesisContext, PoolUpdate, ResolutionMix};
