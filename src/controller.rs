//! Controller wiring the registry, the rebox engine and their
//! collaborators into one transaction surface.
//!
//! Each public method is one atomic transaction: it either succeeds and
//! emits its events, or fails with no effect on the ledger, the registry
//! or the pool.

use crate::config::{ConfigError, ProtocolConfig};
use crate::entropy::{EntropyPool, GenesisContext, PoolUpdate};
use crate::events::{Event, EventLog};
use crate::ledger::Ledger;
use crate::observation::{
    Cancellation, CommitReceipt, ObservationError, ObservationRegistry, ObservationStatus,
    Resolution,
};
use crate::oracle::BlockOracle;
use crate::primitives::{Address, Amount, BlockIndex, Hash32};
use crate::rebox::{calculate_output, ReboxEngine, ReboxError, ReboxQuote};

/// Running totals over the controller's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    /// Observations committed.
    pub commits: u64,
    /// Reveals by the owning account.
    pub reveals: u64,
    /// Reveals submitted by a third party.
    pub forced_reveals: u64,
    /// Expired observations returned to their owner.
    pub cancels: u64,
    /// Resolutions that collapsed into outcome A.
    pub outcome_a_wins: u64,
    /// Resolutions that collapsed into outcome B.
    pub outcome_b_wins: u64,
    /// Successful rebox operations.
    pub reboxes: u64,
    /// Total rebox fee destroyed.
    pub fee_burned: Amount,
}

/// The observation controller.
pub struct Controller<O: BlockOracle, L: Ledger> {
    address: Address,
    registry: ObservationRegistry,
    rebox: ReboxEngine,
    oracle: O,
    ledger: L,
    events: EventLog,
    stats: ProtocolStats,
}

impl<O: BlockOracle, L: Ledger> Controller<O, L> {
    /// Deploys a controller at `address`.
    ///
    /// The entropy pool is seeded from the oracle's current block and the
    /// deployer and controller identities. `ledger` must accept mint/burn
    /// from `address`.
    pub fn deploy(
        config: ProtocolConfig,
        deployer: Address,
        address: Address,
        oracle: O,
        ledger: L,
    ) -> Result<Self, ConfigError> {
        let pool = EntropyPool::genesis(&GenesisContext {
            timestamp: oracle.timestamp(),
            block_index: oracle.current_index(),
            mix_in: oracle.mix_in(),
            deployer,
            components: vec![address],
        });
        let rebox = ReboxEngine::new(&config, address);
        let registry = ObservationRegistry::new(config, address, pool)?;

        tracing::info!(
            controller = %address,
            deployer = %deployer,
            block_index = oracle.current_index(),
            "Controller deployed"
        );

        Ok(Self {
            address,
            registry,
            rebox,
            oracle,
            ledger,
            events: EventLog::new(),
            stats: ProtocolStats::default(),
        })
    }

    /// Controller identity.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Active protocol parameters.
    pub fn config(&self) -> &ProtocolConfig {
        self.registry.config()
    }

    /// Pending observations and the entropy pool.
    pub fn registry(&self) -> &ObservationRegistry {
        &self.registry
    }

    /// Block oracle in use.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable oracle access, used to move simulated time forward.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Ledger in use.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable ledger access for genesis allocations.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Takes all buffered events.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> ProtocolStats {
        self.stats
    }

    /// Current entropy pool value.
    pub fn entropy_pool(&self) -> Hash32 {
        self.registry.pool().current()
    }

    // Observation lifecycle

    /// Escrows `amount` of the caller's superposed balance behind a
    /// commitment. See [`ObservationRegistry::commit`].
    pub fn commit(
        &mut self,
        caller: &Address,
        amount: Amount,
        data_hash: Hash32,
        user_entropy: Hash32,
    ) -> Result<CommitReceipt, ObservationError> {
        let receipt = self.registry.commit(
            &mut self.ledger,
            &self.oracle,
            caller,
            amount,
            data_hash,
            user_entropy,
        )?;

        self.stats.commits += 1;
        self.emit_pool_update(receipt.pool_update, receipt.observation.ref_block);
        self.events.emit(Event::Committed {
            account: receipt.account,
            amount: receipt.observation.amount,
            data_hash: receipt.observation.data_hash,
            user_entropy_hash: receipt.observation.user_entropy_hash,
            ref_block: receipt.observation.ref_block,
        });
        Ok(receipt)
    }

    /// Resolves the caller's own pending observation.
    pub fn reveal(
        &mut self,
        caller: &Address,
        data: &[u8],
        user_entropy: Hash32,
    ) -> Result<Resolution, ObservationError> {
        let resolution =
            self.registry
                .reveal(&mut self.ledger, &self.oracle, caller, data, user_entropy)?;
        self.record_resolution(&resolution);
        Ok(resolution)
    }

    /// Resolves `account`'s observation on its behalf once the grace
    /// period has passed.
    pub fn force_reveal(
        &mut self,
        caller: &Address,
        account: &Address,
        data: &[u8],
        user_entropy: Hash32,
    ) -> Result<Resolution, ObservationError> {
        let resolution = self.registry.force_reveal(
            &mut self.ledger,
            &self.oracle,
            caller,
            account,
            data,
            user_entropy,
        )?;
        self.record_resolution(&resolution);
        Ok(resolution)
    }

    /// Returns an expired observation's escrow.
    pub fn cancel(&mut self, caller: &Address) -> Result<Cancellation, ObservationError> {
        let cancellation = self.registry.cancel(&mut self.ledger, &self.oracle, caller)?;
        self.stats.cancels += 1;
        self.events.emit(Event::Cancelled {
            account: cancellation.account,
            amount: cancellation.amount,
        });
        Ok(cancellation)
    }

    // Rebox

    /// `(output, fee)` for `pairs` at the configured fee, with no pair
    /// count validation. Fails only on arithmetic overflow.
    pub fn calculate_output(&self, pairs: Amount) -> Result<(Amount, Amount), ReboxError> {
        calculate_output(pairs, self.rebox.fee_bps())
    }

    /// Prices a rebox of `pairs`, applying the same pair-count checks as
    /// [`Self::rebox`].
    pub fn quote_rebox(&self, pairs: Amount) -> Result<ReboxQuote, ReboxError> {
        self.rebox.quote(pairs)
    }

    /// Recombines `pairs` outcome pairs into the superposed balance.
    pub fn rebox(&mut self, caller: &Address, pairs: Amount) -> Result<ReboxQuote, ReboxError> {
        let quote = self.rebox.rebox(&mut self.ledger, caller, pairs)?;
        self.record_rebox(caller, quote);
        Ok(quote)
    }

    /// Recombines every pair the caller holds, up to `cap`.
    pub fn rebox_max(
        &mut self,
        caller: &Address,
        cap: Option<Amount>,
    ) -> Result<ReboxQuote, ReboxError> {
        let quote = self.rebox.rebox_max(&mut self.ledger, caller, cap)?;
        self.record_rebox(caller, quote);
        Ok(quote)
    }

    /// Like [`Self::rebox`], failing if the output is below `min_output`.
    pub fn rebox_with_min_output(
        &mut self,
        caller: &Address,
        pairs: Amount,
        min_output: Amount,
    ) -> Result<ReboxQuote, ReboxError> {
        let quote = self
            .rebox
            .rebox_with_min_output(&mut self.ledger, caller, pairs, min_output)?;
        self.record_rebox(caller, quote);
        Ok(quote)
    }

    // Status queries

    /// Timing snapshot for `account`.
    pub fn status(&self, account: &Address) -> ObservationStatus {
        self.registry.status(&self.oracle, account)
    }

    /// Whether `reveal` would pass its timing and source checks now.
    pub fn can_reveal(&self, account: &Address) -> bool {
        self.registry.can_reveal(&self.oracle, account)
    }

    /// Whether `force_reveal` would pass its timing and source checks now.
    pub fn can_force_reveal(&self, account: &Address) -> bool {
        self.registry.can_force_reveal(&self.oracle, account)
    }

    /// Whether `cancel` would succeed now.
    pub fn can_cancel(&self, account: &Address) -> bool {
        self.registry.can_cancel(&self.oracle, account)
    }

    fn record_resolution(&mut self, resolution: &Resolution) {
        if resolution.forced {
            self.stats.forced_reveals += 1;
        } else {
            self.stats.reveals += 1;
        }
        if resolution.outcome_a > 0 {
            self.stats.outcome_a_wins += 1;
        } else {
            self.stats.outcome_b_wins += 1;
        }

        self.events.emit(if resolution.forced {
            Event::ForceRevealed {
                account: resolution.account,
                revealer: resolution.revealer,
                amount: resolution.amount,
                outcome_a: resolution.outcome_a,
                outcome_b: resolution.outcome_b,
                randomness: resolution.randomness,
            }
        } else {
            Event::Revealed {
                account: resolution.account,
                amount: resolution.amount,
                outcome_a: resolution.outcome_a,
                outcome_b: resolution.outcome_b,
                randomness: resolution.randomness,
            }
        });
        self.emit_pool_update(resolution.pool_update, resolution.block_index);
    }

    fn record_rebox(&mut self, caller: &Address, quote: ReboxQuote) {
        self.stats.reboxes += 1;
        self.stats.fee_burned = self.stats.fee_burned.saturating_add(quote.fee);
        self.events.emit(Event::Reboxed {
            account: *caller,
            pairs: quote.pairs,
            output: quote.output,
            fee: quote.fee,
        });
    }

    fn emit_pool_update(&mut self, update: PoolUpdate, block_index: BlockIndex) {
        self.events.emit(Event::PoolUpdated {
            previous: update.previous,
            current: update.current,
            block_index,
        });
    }
}
