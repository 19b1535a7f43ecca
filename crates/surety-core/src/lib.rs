//! # Flight Surety Core - Cooperative Flight Insurance Ledger
//!
//! This crate contains the ledger state machine shared by the oracle node
//! and any client that drives it. It provides:
//!
//! - Airline admission by founding seat and multi-party vote
//! - Flight registration and status finalization
//! - Oracle registration, index assignment and quorum consensus
//! - Insurance escrow, crediting and withdrawal
//! - A sequenced event log returned with every transaction
//!
//! The ledger is synchronous and single-writer. Callers that share it across
//! tasks wrap it in a mutex.
//!
//! ## Feature Flags
//!
//! - `client`: Enables standard serialization for off-chain use

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod payout;
pub mod randomness;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use config::LedgerConfig;
pub use constants::*;
pub use errors::{SuretyError, SuretyResult};
pub use events::{EventLog, LedgerEvent, Receipt, SequencedEvent};
pub use ledger::Ledger;
pub use payout::{CollectingSink, PayoutError, PayoutSink};
pub use randomness::{IndexSource, RandomIndexSource, ScriptedIndexSource};
pub use state::{
    AdmissionOutcome, Airline, Flight, InsurancePolicy, LedgerState, Oracle, OracleRequest,
    Treasury,
};
pub use types::*;
