//! Prometheus metrics for the observation controller.
//!
//! # Metrics Exposed
//!
//! ## Lifecycle Metrics
//! - `superposition_commits_total` - Observations committed
//! - `superposition_reveals_total` - Observations revealed by their owner
//! - `superposition_forced_reveals_total` - Observations revealed by a third party
//! - `superposition_cancels_total` - Expired observations cancelled
//! - `superposition_pending_observations` - Observations currently pending
//!
//! ## Outcome Metrics
//! - `superposition_outcome_a_total` - Resolutions that collapsed into outcome A
//! - `superposition_outcome_b_total` - Resolutions that collapsed into outcome B
//!
//! ## Rebox Metrics
//! - `superposition_reboxes_total` - Rebox operations performed
//! - `superposition_rebox_fee_burned` - Total fee destroyed by rebox
//!
//! ## Pool Metrics
//! - `superposition_pool_updates_total` - Entropy pool updates since genesis
//! - `superposition_block_index` - Block index at the last update
//!
//! # Example
//!
//! ```no_run
//! use superposition::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     commits: 10,
//!     reveals: 8,
//!     forced_reveals: 1,
//!     cancels: 1,
//!     pending_observations: 0,
//!     outcome_a: 5,
//!     outcome_b: 4,
//!     reboxes: 2,
//!     fee_burned: 12,
//!     pool_updates: 19,
//!     block_index: 4_200,
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
