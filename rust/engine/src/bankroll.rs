use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Bankroll a new player starts with, and what a reset restores.
pub const INITIAL_BANKROLL: u32 = 1000;

/// The player's chips. Never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bankroll {
    balance: u32,
}

impl Default for Bankroll {
    fn default() -> Self {
        Self::new(INITIAL_BANKROLL)
    }
}

impl Bankroll {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn debit(&mut self, amount: u32) -> Result<(), GameError> {
        if amount == 0 {
            return Ok(());
        }
        if amount > self.balance {
            return Err(GameError::InsufficientBankroll {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}
