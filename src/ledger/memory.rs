//! In-memory ledger.

use super::{Ledger, LedgerError, Token};
use crate::primitives::{Address, Amount};
use std::collections::HashMap;

/// Ledger holding balances in process memory.
///
/// Mint and burn are restricted to a single controller identity fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    controller: Address,
    balances: HashMap<(Token, Address), Amount>,
    supply: HashMap<Token, Amount>,
}

impl InMemoryLedger {
    /// Creates an empty ledger that accepts mint/burn only from `controller`.
    pub fn new(controller: Address) -> Self {
        Self {
            controller,
            balances: HashMap::new(),
            supply: HashMap::new(),
        }
    }

    /// The only identity allowed to mint or burn.
    pub fn controller(&self) -> Address {
        self.controller
    }

    /// Seeds a balance outside the controller path (genesis allocation).
    pub fn credit(
        &mut self,
        token: Token,
        account: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let controller = self.controller;
        self.mint(&controller, token, account, amount)
    }

    fn authorize(&self, authority: &Address) -> Result<(), LedgerError> {
        if *authority != self.controller {
            return Err(LedgerError::Unauthorized(*authority));
        }
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn mint(
        &mut self,
        authority: &Address,
        token: Token,
        account: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.authorize(authority)?;

        let balance = self.balance_of(token, account);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(token))?;
        let new_supply = self
            .total_supply(token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(token))?;

        self.balances.insert((token, *account), new_balance);
        self.supply.insert(token, new_supply);

        tracing::trace!(%token, %account, amount, "Minted");
        Ok(())
    }

    fn burn(
        &mut self,
        authority: &Address,
        token: Token,
        account: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.authorize(authority)?;

        let balance = self.balance_of(token, account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                token,
                available: balance,
                required: amount,
            });
        }

        self.balances.insert((token, *account), balance - amount);
        let supply = self.total_supply(token);
        self.supply.insert(token, supply.saturating_sub(amount));

        tracing::trace!(%token, %account, amount, "Burned");
        Ok(())
    }

    fn balance_of(&self, token: Token, account: &Address) -> Amount {
        self.balances.get(&(token, *account)).copied().unwrap_or(0)
    }

    fn total_supply(&self, token: Token) -> Amount {
        self.supply.get(&token).copied().unwrap_or(0)
    }
}
