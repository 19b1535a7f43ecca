//! # Protocol Constants
//!
//! Default values for the cooperative insurance ledger:
//! - Currency units
//! - Airline admission (fees, founding seats)
//! - Oracle consensus (fee, index space, quorum)
//! - Insurance escrow (cap, payout ratio)
//!
//! Every constant here is only a default; the live values are carried by
//! [`crate::config::LedgerConfig`].

use crate::types::Amount;

// ============================================================================
// Currency Units
// ============================================================================

/// Base units per whole unit of currency
pub const UNIT: Amount = 1_000_000_000;

// ============================================================================
// Airline Admission Constants
// ============================================================================

/// Fee an admitted airline pays before it may act (10 units)
pub const REGISTRATION_FEE: Amount = 10 * UNIT;

/// Number of airlines admitted without a vote
pub const FOUNDING_SEATS: u32 = 4;

// ============================================================================
// Oracle Consensus Constants
// ============================================================================

/// Fee an oracle pays to register (1 unit)
pub const ORACLE_FEE: Amount = UNIT;

/// Matching responses needed to finalize a flight status
pub const QUORUM: u32 = 3;

/// Size of the index space oracles and requests draw from (indexes 0..=9)
pub const ORACLE_INDEX_SPACE: u8 = 10;

/// Indexes assigned to each oracle
pub const INDEXES_PER_ORACLE: usize = 3;

// ============================================================================
// Insurance Constants
// ============================================================================

/// Maximum premium per policy (1 unit)
pub const MAX_INSURANCE: Amount = UNIT;

/// Payout ratio numerator (credit = premium * 3 / 2)
pub const PAYOUT_NUMERATOR: u64 = 3;

/// Payout ratio denominator
pub const PAYOUT_DENOMINATOR: u64 = 2;

// ============================================================================
// Helper Functions
// ============================================================================

/// Votes required to admit a candidate when `registered` airlines exist
pub const fn admission_threshold(registered: u32) -> u32 {
    registered.div_ceil(2)
}

/// Convert whole units to base units
pub const fn units(whole: u64) -> Amount {
    whole * UNIT
}
