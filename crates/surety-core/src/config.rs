//! # Ledger Configuration
//!
//! Fees, caps and consensus parameters fixed at ledger creation.

use crate::constants::*;
use crate::errors::{SuretyError, SuretyResult};
use crate::types::Amount;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Parameters exposed to collaborators as configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "client", serde(default))]
pub struct LedgerConfig {
    /// Exact fee an admitted airline pays (base units)
    pub registration_fee: Amount,

    /// Minimum fee an oracle pays to register (base units)
    pub oracle_fee: Amount,

    /// Maximum premium per policy (base units)
    pub max_insurance: Amount,

    /// Matching oracle responses needed to finalize a status
    pub quorum: u32,

    /// Airlines admitted without a vote
    pub founding_seats: u32,

    /// Indexes are drawn from `0..oracle_index_space`
    pub oracle_index_space: u8,

    /// Credit = premium * numerator / denominator, floored
    pub payout_numerator: u64,
    pub payout_denominator: u64,
}

impl LedgerConfig {
    /// Validate configuration
    pub fn validate(&self) -> SuretyResult<()> {
        if self.quorum == 0 {
            return Err(SuretyError::invalid_config("quorum must be greater than 0"));
        }

        if self.founding_seats == 0 {
            return Err(SuretyError::invalid_config(
                "founding_seats must be greater than 0",
            ));
        }

        if self.oracle_index_space == 0 {
            return Err(SuretyError::invalid_config(
                "oracle_index_space must be greater than 0",
            ));
        }

        if self.max_insurance == 0 {
            return Err(SuretyError::invalid_config(
                "max_insurance must be greater than 0",
            ));
        }

        if self.payout_denominator == 0 {
            return Err(SuretyError::invalid_config(
                "payout_denominator must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Credit owed for a premium, floored
    pub fn credit_for(&self, premium: Amount) -> SuretyResult<Amount> {
        premium
            .checked_mul(self.payout_numerator)
            .map(|scaled| scaled / self.payout_denominator)
            .ok_or(SuretyError::MathOverflow)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            registration_fee: REGISTRATION_FEE,
            oracle_fee: ORACLE_FEE,
            max_insurance: MAX_INSURANCE,
            quorum: QUORUM,
            founding_seats: FOUNDING_SEATS,
            oracle_index_space: ORACLE_INDEX_SPACE,
            payout_numerator: PAYOUT_NUMERATOR,
            payout_denominator: PAYOUT_DENOMINATOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = LedgerConfig::default();
        assert!(config.validate().is_ok());

        config.quorum = 0;
        assert!(config.validate().is_err());

        let config = LedgerConfig {
            payout_denominator: 0,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LedgerConfig {
            oracle_index_space: 0,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credit_is_floored() {
        let config = LedgerConfig::default();
        assert_eq!(config.credit_for(UNIT).unwrap(), 1_500_000_000);
        assert_eq!(config.credit_for(1).unwrap(), 1);
        assert_eq!(config.credit_for(3).unwrap(), 4);
        assert_eq!(
            config.credit_for(Amount::MAX),
            Err(SuretyError::MathOverflow)
        );
    }
}
