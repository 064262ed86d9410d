//! Recombination of outcome pairs back into the superposed balance.

mod engine;

pub use engine::{calculate_output, ReboxEngine, ReboxError, ReboxQuote};
