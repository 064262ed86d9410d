//! Observability events.
//!
//! Events describe what happened; nothing in the protocol reads them back.

use crate::primitives::{Address, Amount, BlockIndex, Hash32};

/// A protocol event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An observation was committed.
    Committed {
        account: Address,
        amount: Amount,
        data_hash: Hash32,
        user_entropy_hash: Hash32,
        ref_block: BlockIndex,
    },
    /// An observation was revealed by its owner.
    Revealed {
        account: Address,
        amount: Amount,
        outcome_a: Amount,
        outcome_b: Amount,
        randomness: Hash32,
    },
    /// An observation was revealed by a third party.
    ForceRevealed {
        account: Address,
        revealer: Address,
        amount: Amount,
        outcome_a: Amount,
        outcome_b: Amount,
        randomness: Hash32,
    },
    /// An expired observation was cancelled.
    Cancelled { account: Address, amount: Amount },
    /// Outcome pairs were recombined.
    Reboxed {
        account: Address,
        pairs: Amount,
        output: Amount,
        fee: Amount,
    },
    /// The entropy pool moved.
    PoolUpdated {
        previous: Hash32,
        current: Hash32,
        block_index: BlockIndex,
    },
}

impl Event {
    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Committed { .. } => "committed",
            Event::Revealed { .. } => "revealed",
            Event::ForceRevealed { .. } => "force_revealed",
            Event::Cancelled { .. } => "cancelled",
            Event::Reboxed { .. } => "reboxed",
            Event::PoolUpdated { .. } => "pool_updated",
        }
    }
}

/// Append-only buffer of emitted events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event and mirrors it to the tracing subscriber.
    pub fn emit(&mut self, event: Event) {
        tracing::debug!(event = event.name(), ?event, "Event emitted");
        self.events.push(event);
    }

    /// Events emitted so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns every recorded event.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
