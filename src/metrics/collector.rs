//! Metrics collection and registry.

use crate::controller::Controller;
use crate::ledger::Ledger;
use crate::oracle::BlockOracle;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failure.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of controller state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Observations committed.
    pub commits: u64,
    /// Owner reveals.
    pub reveals: u64,
    /// Third-party reveals.
    pub forced_reveals: u64,
    /// Cancellations.
    pub cancels: u64,
    /// Observations currently pending.
    pub pending_observations: usize,
    /// Resolutions into outcome A.
    pub outcome_a: u64,
    /// Resolutions into outcome B.
    pub outcome_b: u64,
    /// Rebox operations.
    pub reboxes: u64,
    /// Total rebox fee destroyed (saturating at `u64::MAX`).
    pub fee_burned: u64,
    /// Entropy pool updates since genesis.
    pub pool_updates: u64,
    /// Current block index.
    pub block_index: u64,
}

/// Prometheus metrics registry for the observation controller.
pub struct MetricsRegistry {
    registry: Registry,

    // Lifecycle metrics
    commits_total: IntCounter,
    reveals_total: IntCounter,
    forced_reveals_total: IntCounter,
    cancels_total: IntCounter,
    pending_observations: IntGauge,

    // Outcome metrics
    outcome_a_total: IntCounter,
    outcome_b_total: IntCounter,

    // Rebox metrics
    reboxes_total: IntCounter,
    rebox_fee_burned: IntCounter,

    // Pool metrics
    pool_updates_total: IntCounter,
    block_index: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all controller metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let commits_total =
            IntCounter::new("superposition_commits_total", "Observations committed")?;
        let reveals_total = IntCounter::new(
            "superposition_reveals_total",
            "Observations revealed by their owner",
        )?;
        let forced_reveals_total = IntCounter::new(
            "superposition_forced_reveals_total",
            "Observations revealed by a third party",
        )?;
        let cancels_total = IntCounter::new(
            "superposition_cancels_total",
            "Expired observations cancelled",
        )?;
        let pending_observations = IntGauge::new(
            "superposition_pending_observations",
            "Observations currently pending",
        )?;

        let outcome_a_total = IntCounter::new(
            "superposition_outcome_a_total",
            "Resolutions that collapsed into outcome A",
        )?;
        let outcome_b_total = IntCounter::new(
            "superposition_outcome_b_total",
            "Resolutions that collapsed into outcome B",
        )?;

        let reboxes_total =
            IntCounter::new("superposition_reboxes_total", "Rebox operations performed")?;
        let rebox_fee_burned = IntCounter::new(
            "superposition_rebox_fee_burned",
            "Total fee destroyed by rebox",
        )?;

        let pool_updates_total = IntCounter::new(
            "superposition_pool_updates_total",
            "Entropy pool updates since genesis",
        )?;
        let block_index = IntGauge::new(
            "superposition_block_index",
            "Block index at the last update",
        )?;

        registry.register(Box::new(commits_total.clone()))?;
        registry.register(Box::new(reveals_total.clone()))?;
        registry.register(Box::new(forced_reveals_total.clone()))?;
        registry.register(Box::new(cancels_total.clone()))?;
        registry.register(Box::new(pending_observations.clone()))?;
        registry.register(Box::new(outcome_a_total.clone()))?;
        registry.register(Box::new(outcome_b_total.clone()))?;
        registry.register(Box::new(reboxes_total.clone()))?;
        registry.register(Box::new(rebox_fee_burned.clone()))?;
        registry.register(Box::new(pool_updates_total.clone()))?;
        registry.register(Box::new(block_index.clone()))?;

        Ok(Self {
            registry,
            commits_total,
            reveals_total,
            forced_reveals_total,
            cancels_total,
            pending_observations,
            outcome_a_total,
            outcome_b_total,
            reboxes_total,
            rebox_fee_burned,
            pool_updates_total,
            block_index,
        })
    }

    /// Updates all metrics from a snapshot of controller state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward, by the difference
        advance(&self.commits_total, snapshot.commits);
        advance(&self.reveals_total, snapshot.reveals);
        advance(&self.forced_reveals_total, snapshot.forced_reveals);
        advance(&self.cancels_total, snapshot.cancels);
        advance(&self.outcome_a_total, snapshot.outcome_a);
        advance(&self.outcome_b_total, snapshot.outcome_b);
        advance(&self.reboxes_total, snapshot.reboxes);
        advance(&self.rebox_fee_burned, snapshot.fee_burned);
        advance(&self.pool_updates_total, snapshot.pool_updates);

        self.pending_observations
            .set(i64::try_from(snapshot.pending_observations).unwrap_or(i64::MAX));
        self.block_index
            .set(i64::try_from(snapshot.block_index).unwrap_or(i64::MAX));
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the current state of a controller.
    pub fn from_controller<O: BlockOracle, L: Ledger>(controller: &Controller<O, L>) -> Self {
        let stats = controller.stats();
        Self {
            commits: stats.commits,
            reveals: stats.reveals,
            forced_reveals: stats.forced_reveals,
            cancels: stats.cancels,
            pending_observations: controller.registry().pending_count(),
            outcome_a: stats.outcome_a_wins,
            outcome_b: stats.outcome_b_wins,
            reboxes: stats.reboxes,
            fee_burned: u64::try_from(stats.fee_burned).unwrap_or(u64::MAX),
            pool_updates: controller.registry().pool().updates(),
            block_index: controller.oracle().current_index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            commits: 10,
            reveals: 7,
            forced_reveals: 2,
            cancels: 1,
            pending_observations: 0,
            outcome_a: 4,
            outcome_b: 5,
            reboxes: 3,
            fee_burned: 15,
            pool_updates: 19,
            block_index: 1_234,
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("superposition_commits_total 10"));
        assert!(output.contains("superposition_forced_reveals_total 2"));
        assert!(output.contains("superposition_rebox_fee_burned 15"));
        assert!(output.contains("superposition_block_index 1234"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            commits: 5,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            commits: 3,
            ..Default::default()
        });
        let output = registry.encode().unwrap();
        assert!(output.contains("superposition_commits_total 5"));
    }
}
