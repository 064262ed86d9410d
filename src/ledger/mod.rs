//! Fungible balance ledger collaborator.
//!
//! Three balances are tracked per account: the superposed balance that
//! observations escrow, and the two mutually exclusive outcome balances
//! an observation collapses into. Only the controller may mint or burn.

mod memory;

pub use memory::InMemoryLedger;

use crate::primitives::{Address, Amount};
use thiserror::Error;

/// The three balances managed on behalf of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// Balance escrowed by commits and re-minted by rebox and cancel.
    Superposed,
    /// First outcome balance.
    OutcomeA,
    /// Second outcome balance.
    OutcomeB,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Superposed => write!(f, "superposed"),
            Token::OutcomeA => write!(f, "outcome-a"),
            Token::OutcomeB => write!(f, "outcome-b"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("caller {0} is not authorized to mint or burn")]
    Unauthorized(Address),
    #[error("insufficient {token} balance: have {available}, need {required}")]
    InsufficientBalance {
        token: Token,
        available: Amount,
        required: Amount,
    },
    #[error("{0} supply overflow")]
    Overflow(Token),
}

/// Trait for ledger implementations.
///
/// Each call is atomic: on error no balance changes.
pub trait Ledger {
    /// Credits `amount` of `token` to `account`.
    fn mint(
        &mut self,
        authority: &Address,
        token: Token,
        account: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Debits `amount` of `token` from `account`.
    fn burn(
        &mut self,
        authority: &Address,
        token: Token,
        account: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Current balance of `account`.
    fn balance_of(&self, token: Token, account: &Address) -> Amount;

    /// Total outstanding supply of `token`.
    fn total_supply(&self, token: Token) -> Amount;
}
