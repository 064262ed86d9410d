//! Pair-burn / mint orchestration with a basis-point fee.
//!
//! One unit of each outcome balance recombines into two units of the
//! superposed balance, minus a fee:
//!
//! ```text
//! base   = 2 * pairs
//! fee    = floor(base * fee_bps / 10_000)
//! output = base - fee
//! ```
//!
//! The fee is never minted anywhere; it is destroyed.

use crate::config::{ProtocolConfig, BPS_DENOMINATOR};
use crate::ledger::{Ledger, LedgerError, Token};
use crate::primitives::{Address, Amount};
use thiserror::Error;

/// Errors that can occur during rebox.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReboxError {
    #[error("pair count must be non-zero")]
    ZeroPairs,
    #[error("pair count {pairs} exceeds maximum {max}")]
    TooManyPairs { pairs: Amount, max: Amount },
    #[error("no complete pairs available to rebox")]
    NothingToRebox,
    #[error("output {output} is below the requested minimum {min_output}")]
    InsufficientOutput { output: Amount, min_output: Amount },
    #[error("fee arithmetic overflow")]
    Overflow,
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Output and fee for a given pair count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReboxQuote {
    /// Pairs burned from each outcome balance.
    pub pairs: Amount,
    /// Superposed amount minted.
    pub output: Amount,
    /// Amount destroyed as fee.
    pub fee: Amount,
}

/// Computes `(output, fee)` for `pairs` at `fee_bps`.
///
/// Integer-only; `output + fee == 2 * pairs` always holds.
pub fn calculate_output(pairs: Amount, fee_bps: u16) -> Result<(Amount, Amount), ReboxError> {
    let base = pairs.checked_mul(2).ok_or(ReboxError::Overflow)?;
    let fee = base
        .checked_mul(Amount::from(fee_bps))
        .ok_or(ReboxError::Overflow)?
        / BPS_DENOMINATOR;
    Ok((base - fee, fee))
}

/// Recombines outcome pairs into the superposed balance.
#[derive(Debug, Clone)]
pub struct ReboxEngine {
    max_pairs: Amount,
    fee_bps: u16,
    /// Identity presented to the ledger for mint/burn.
    authority: Address,
}

impl ReboxEngine {
    /// Creates an engine using the caps and fee of `config`.
    pub fn new(config: &ProtocolConfig, authority: Address) -> Self {
        Self {
            max_pairs: config.max_rebox_pairs,
            fee_bps: config.rebox_fee_bps,
            authority,
        }
    }

    /// Fee in basis points.
    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    /// Largest pair count accepted by a single rebox.
    pub fn max_pairs(&self) -> Amount {
        self.max_pairs
    }

    /// Validates `pairs` and prices it.
    pub fn quote(&self, pairs: Amount) -> Result<ReboxQuote, ReboxError> {
        if pairs == 0 {
            return Err(ReboxError::ZeroPairs);
        }
        if pairs > self.max_pairs {
            return Err(ReboxError::TooManyPairs {
                pairs,
                max: self.max_pairs,
            });
        }
        let (output, fee) = calculate_output(pairs, self.fee_bps)?;
        Ok(ReboxQuote { pairs, output, fee })
    }

    /// Burns `pairs` of each outcome from `caller` and mints the output.
    pub fn rebox<L: Ledger>(
        &self,
        ledger: &mut L,
        caller: &Address,
        pairs: Amount,
    ) -> Result<ReboxQuote, ReboxError> {
        let quote = self.quote(pairs)?;
        self.execute(ledger, caller, quote)
    }

    /// Reboxes as many pairs as the caller holds, optionally capped.
    ///
    /// The pair count is additionally clamped to the per-call maximum.
    pub fn rebox_max<L: Ledger>(
        &self,
        ledger: &mut L,
        caller: &Address,
        cap: Option<Amount>,
    ) -> Result<ReboxQuote, ReboxError> {
        let held = ledger
            .balance_of(Token::OutcomeA, caller)
            .min(ledger.balance_of(Token::OutcomeB, caller));
        let pairs = held
            .min(cap.unwrap_or(Amount::MAX))
            .min(self.max_pairs);
        if pairs == 0 {
            return Err(ReboxError::NothingToRebox);
        }
        self.rebox(ledger, caller, pairs)
    }

    /// Reboxes `pairs` only if the output is at least `min_output`.
    pub fn rebox_with_min_output<L: Ledger>(
        &self,
        ledger: &mut L,
        caller: &Address,
        pairs: Amount,
        min_output: Amount,
    ) -> Result<ReboxQuote, ReboxError> {
        let quote = self.quote(pairs)?;
        if quote.output < min_output {
            return Err(ReboxError::InsufficientOutput {
                output: quote.output,
                min_output,
            });
        }
        self.execute(ledger, caller, quote)
    }

    fn execute<L: Ledger>(
        &self,
        ledger: &mut L,
        caller: &Address,
        quote: ReboxQuote,
    ) -> Result<ReboxQuote, ReboxError> {
        // Check both sides up front so a short B balance cannot leave A burned.
        for token in [Token::OutcomeA, Token::OutcomeB] {
            let available = ledger.balance_of(token, caller);
            if available < quote.pairs {
                return Err(LedgerError::InsufficientBalance {
                    token,
                    available,
                    required: quote.pairs,
                }
                .into());
            }
        }
        ledger
            .total_supply(Token::Superposed)
            .checked_add(quote.output)
            .ok_or(LedgerError::Overflow(Token::Superposed))?;

        ledger.burn(&self.authority, Token::OutcomeA, caller, quote.pairs)?;
        ledger.burn(&self.authority, Token::OutcomeB, caller, quote.pairs)?;
        ledger.mint(&self.authority, Token::Superposed, caller, quote.output)?;

        tracing::info!(
            account = %caller,
            pairs = quote.pairs,
            output = quote.output,
            fee = quote.fee,
            "Reboxed outcome pairs"
        );

        Ok(quote)
    }
}
