pub mod client;
pub mod config;
pub mod error;
pub mod node;
pub mod proposer;
pub mod simulation;

pub use client::{InProcessLedger, LedgerClient};
pub use config::{FlightSpec, NodeConfig, ProposerMode, SimulationConfig};
pub use error::{NodeError, NodeResult};
pub use node::{NodeStats, OracleNode, StatusRequest};
pub use proposer::{FixedStatusProposer, RandomStatusProposer, StatusProposer};
pub use simulation::{FlightReport, PayoutReport, Simulation, SimulationReport};
