//! Pooled currency balance shared by fee intake, premium intake and payouts.
//!
//! Intake is monotonic and every payout is bounded by the current balance:
//! `balance == airline_fees + oracle_fees + premiums - paid_out` at all times.

use crate::errors::{SuretyError, SuretyResult};
use crate::types::Amount;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct Treasury {
    balance: Amount,
    airline_fees: Amount,
    oracle_fees: Amount,
    premiums: Amount,
    paid_out: Amount,
}

impl Treasury {
    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn airline_fees(&self) -> Amount {
        self.airline_fees
    }

    pub fn oracle_fees(&self) -> Amount {
        self.oracle_fees
    }

    pub fn premiums(&self) -> Amount {
        self.premiums
    }

    pub fn paid_out(&self) -> Amount {
        self.paid_out
    }

    /// Total ever received
    pub fn total_intake(&self) -> Amount {
        self.airline_fees
            .saturating_add(self.oracle_fees)
            .saturating_add(self.premiums)
    }

    pub fn deposit_airline_fee(&mut self, amount: Amount) -> SuretyResult<()> {
        let balance = checked_add(self.balance, amount)?;
        let airline_fees = checked_add(self.airline_fees, amount)?;
        self.balance = balance;
        self.airline_fees = airline_fees;
        Ok(())
    }

    pub fn deposit_oracle_fee(&mut self, amount: Amount) -> SuretyResult<()> {
        let balance = checked_add(self.balance, amount)?;
        let oracle_fees = checked_add(self.oracle_fees, amount)?;
        self.balance = balance;
        self.oracle_fees = oracle_fees;
        Ok(())
    }

    pub fn deposit_premium(&mut self, amount: Amount) -> SuretyResult<()> {
        let balance = checked_add(self.balance, amount)?;
        let premiums = checked_add(self.premiums, amount)?;
        self.balance = balance;
        self.premiums = premiums;
        Ok(())
    }

    pub fn ensure_can_pay(&self, amount: Amount) -> SuretyResult<()> {
        if amount > self.balance {
            return Err(SuretyError::InsufficientPoolBalance);
        }
        Ok(())
    }

    /// Release funds from the pool
    pub fn pay_out(&mut self, amount: Amount) -> SuretyResult<()> {
        self.ensure_can_pay(amount)?;
        let paid_out = checked_add(self.paid_out, amount)?;
        self.balance -= amount;
        self.paid_out = paid_out;
        Ok(())
    }

    /// Return funds whose transfer failed to the pool
    pub fn reverse_payout(&mut self, amount: Amount) -> SuretyResult<()> {
        let paid_out = self
            .paid_out
            .checked_sub(amount)
            .ok_or(SuretyError::MathOverflow)?;
        let balance = checked_add(self.balance, amount)?;
        self.balance = balance;
        self.paid_out = paid_out;
        Ok(())
    }

    /// The conservation invariant
    pub fn is_balanced(&self) -> bool {
        self.airline_fees
            .checked_add(self.oracle_fees)
            .and_then(|sum| sum.checked_add(self.premiums))
            .and_then(|sum| sum.checked_sub(self.paid_out))
            == Some(self.balance)
    }
}

fn checked_add(a: Amount, b: Amount) -> SuretyResult<Amount> {
    a.checked_add(b).ok_or(SuretyError::MathOverflow)
}
