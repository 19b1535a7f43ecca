//! External payout seam used by [`Ledger::withdraw`].
//!
//! The sink receives a mutable handle to the ledger, so a recipient can call
//! back into it while funds are in flight. The ledger has already debited
//! the passenger's credit by then.

use thiserror::Error;

use crate::ledger::Ledger;
use crate::types::{AccountId, Amount};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("Recipient rejected transfer: {0}")]
    Rejected(String),

    #[error("Payout channel unavailable")]
    Unavailable,
}

/// Moves withdrawn funds out of the ledger
pub trait PayoutSink {
    fn transfer(
        &mut self,
        ledger: &mut Ledger,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), PayoutError>;
}

/// Records every transfer it is handed
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    transfers: Vec<(AccountId, Amount)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> &[(AccountId, Amount)] {
        &self.transfers
    }

    pub fn total(&self) -> Amount {
        self.transfers.iter().map(|(_, amount)| *amount).sum()
    }

    pub fn total_to(&self, account: &AccountId) -> Amount {
        self.transfers
            .iter()
            .filter(|(to, _)| to == account)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl PayoutSink for CollectingSink {
    fn transfer(
        &mut self,
        _ledger: &mut Ledger,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), PayoutError> {
        self.transfers.push((to, amount));
        Ok(())
    }
}
