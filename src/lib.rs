//! Superposition Observation Library
//!
//! A commit-reveal randomness protocol that collapses a fungible
//! "superposed" balance into one of two mutually exclusive outcome
//! balances, plus a fee-bearing path that recombines outcome pairs back
//! into the superposed balance.
//!
//! # Architecture
//!
//! ```text
//! caller → controller → observation registry ─┬→ ledger (burn / mint)
//!                              │               ├→ entropy pool
//!                              │               └→ block oracle
//!                              └→ rebox engine ──→ ledger (burn / mint)
//! ```
//!
//! # Design Principles
//!
//! - **No single party decides**: the outcome depends on the account's
//!   secret, a block hash unknown at commit time, and a pool shaped by
//!   every other observation
//! - **One bit per observation**: the whole amount goes to one side,
//!   independent of its size
//! - **Funds are never stuck**: a pending observation always resolves via
//!   reveal, force-reveal or, once expired, cancel
//! - **All or nothing**: a failed operation leaves no trace
//!
//! # Example
//!
//! ```no_run
//! use superposition::{
//!     entropy::keccak,
//!     ledger::{InMemoryLedger, Token},
//!     oracle::MockOracle,
//!     Address, Controller, Hash32, ProtocolConfig,
//! };
//!
//! let controller_id = Address::repeat(0xc0);
//! let alice = Address::repeat(0xa1);
//!
//! let mut ledger = InMemoryLedger::new(controller_id);
//! ledger.credit(Token::Superposed, &alice, 1_000).unwrap();
//!
//! let mut controller = Controller::deploy(
//!     ProtocolConfig::default(),
//!     Address::repeat(0xde),
//!     controller_id,
//!     MockOracle::default(),
//!     ledger,
//! )
//! .unwrap();
//!
//! let secret = Hash32::from_low_u64(0x5eed);
//! controller.commit(&alice, 100, keccak(b"hello"), secret).unwrap();
//!
//! controller.oracle_mut().advance(6);
//! let resolution = controller.reveal(&alice, b"hello", secret).unwrap();
//! assert_eq!(resolution.outcome_a + resolution.outcome_b, 100);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod entropy;
pub mod events;
pub mod ledger;
pub mod metrics;
pub mod observation;
pub mod oracle;
pub mod primitives;
pub mod rebox;

// Re-export commonly used types at crate root
pub use config::{ConfigError, FileConfig, ProtocolConfig, SimulationConfig};
pub use controller::{Controller, ProtocolStats};
pub use entropy::{EntropyPool, Outcome};
pub use events::Event;
pub use ledger::{InMemoryLedger, Ledger, LedgerError, Token};
pub use observation::{ObservationError, ObservationRegistry, ObservationStatus, PendingObservation};
pub use oracle::{BlockOracle, MockOracle, SimulatedChain};
pub use primitives::{Address, Amount, BlockIndex, Hash32};
pub use rebox::{calculate_output, ReboxEngine, ReboxError, ReboxQuote};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
