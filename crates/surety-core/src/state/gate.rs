//! Process-wide on/off switch. Every mutating component operation reads it
//! first and fails fast with [`SuretyError::NotOperational`].

use crate::errors::{SuretyError, SuretyResult};
use crate::events::LedgerEvent;
use crate::types::AccountId;

#[derive(Debug, Clone)]
pub struct OperationalGate {
    /// Only identity allowed to flip the switch
    owner: AccountId,
    operational: bool,
}

impl OperationalGate {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            operational: true,
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Fail fast when the ledger is paused
    pub fn ensure_operational(&self) -> SuretyResult<()> {
        if !self.operational {
            return Err(SuretyError::NotOperational);
        }
        Ok(())
    }

    /// Owner-only. Not itself gated, so a paused ledger can be resumed.
    pub fn set_operational_state(
        &mut self,
        caller: AccountId,
        operational: bool,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<()> {
        if caller != self.owner {
            return Err(SuretyError::Unauthorized);
        }

        if self.operational == operational {
            log::debug!("Operational state already {}", operational);
            return Ok(());
        }

        self.operational = operational;
        events.push(LedgerEvent::OperationalStateChanged { operational });

        if operational {
            log::info!("Ledger resumed");
        } else {
            log::warn!("Ledger paused by owner");
        }

        Ok(())
    }
}
