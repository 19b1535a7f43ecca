//! # Ledger State
//!
//! Each component owns its own table. Cross-component effects are passed
//! explicitly: a component receives the gate and whichever collaborators
//! it reads or writes, never a back-reference to the whole ledger.

pub mod airline;
pub mod escrow;
pub mod flight;
pub mod gate;
pub mod oracle;
pub mod treasury;

pub use airline::{AdmissionOutcome, Airline, AirlineRegistry};
pub use escrow::{InsurancePolicy, InsuranceEscrow};
pub use flight::{Flight, FlightRegistry};
pub use gate::OperationalGate;
pub use oracle::{Oracle, OracleConsensus, OracleRequest};
pub use treasury::Treasury;

use crate::config::LedgerConfig;
use crate::types::AccountId;

/// Every table the ledger persists
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub gate: OperationalGate,
    pub airlines: AirlineRegistry,
    pub flights: FlightRegistry,
    pub oracles: OracleConsensus,
    pub escrow: InsuranceEscrow,
    pub treasury: Treasury,
}

impl LedgerState {
    pub fn new(
        config: &LedgerConfig,
        owner: AccountId,
        genesis: AccountId,
        genesis_name: String,
    ) -> Self {
        Self {
            gate: OperationalGate::new(owner),
            airlines: AirlineRegistry::new(config, genesis, genesis_name),
            flights: FlightRegistry::new(),
            oracles: OracleConsensus::new(config),
            escrow: InsuranceEscrow::new(config),
            treasury: Treasury::default(),
        }
    }
}
