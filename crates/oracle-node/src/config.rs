use std::fs;

use flight_surety_core::{Amount, LedgerConfig, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};

/// Oracle node configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Oracle accounts the node registers and answers for
    pub oracle_count: u32,

    /// Delay between event log polls in milliseconds
    pub poll_interval_ms: u64,

    /// Seeds both the ledger index source and the random proposer
    pub seed: Option<u64>,

    /// Submit from every oracle instead of only the index holders
    pub broadcast: bool,

    /// How oracles pick the status they report
    pub proposer: ProposerMode,

    /// Parameters of the in-process ledger
    pub ledger: LedgerConfig,

    /// Scripted participants for the simulation run
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposerMode {
    /// Uniform over every status code
    Random,
    /// Always the given wire code
    Fixed(u8),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Airline names; the first one is the genesis airline
    pub airlines: Vec<String>,

    pub flights: Vec<FlightSpec>,

    /// Passenger `n` insures flight `n % flights.len()`
    pub passengers: u32,

    /// Premium each passenger pays (base units)
    pub premium: Amount,

    /// Request/poll rounds before the node is stopped
    pub rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlightSpec {
    /// Position of the operating airline in `airlines`
    #[serde(default)]
    pub airline: usize,
    pub flight_number: String,
    pub departure_time: i64,
}

impl NodeConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> NodeResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::debug!("Loaded node configuration from {}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> NodeResult<Self> {
        let config: NodeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> NodeResult<()> {
        self.ledger.validate()?;

        if self.oracle_count < self.ledger.quorum {
            return Err(NodeError::invalid_config(format!(
                "oracle_count ({}) must be at least the quorum ({})",
                self.oracle_count, self.ledger.quorum
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(NodeError::invalid_config(
                "poll_interval_ms must be greater than 0",
            ));
        }

        if let ProposerMode::Fixed(code) = self.proposer {
            StatusCode::try_from(code)?;
        }

        self.simulation.validate(&self.ledger)
    }
}

impl SimulationConfig {
    fn validate(&self, ledger: &LedgerConfig) -> NodeResult<()> {
        if self.airlines.is_empty() {
            return Err(NodeError::invalid_config("at least one airline is required"));
        }

        for flight in &self.flights {
            if flight.airline >= self.airlines.len() {
                return Err(NodeError::invalid_config(format!(
                    "flight {} refers to airline {} of {}",
                    flight.flight_number,
                    flight.airline,
                    self.airlines.len()
                )));
            }
        }

        if self.passengers > 0 && self.flights.is_empty() {
            return Err(NodeError::invalid_config(
                "passengers need at least one flight to insure",
            ));
        }

        if self.premium == 0 || self.premium > ledger.max_insurance {
            return Err(NodeError::invalid_config(format!(
                "premium must be in 1..={}",
                ledger.max_insurance
            )));
        }

        if self.rounds == 0 {
            return Err(NodeError::invalid_config("rounds must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            oracle_count: 20,
            poll_interval_ms: 100,
            seed: None,
            broadcast: false,
            proposer: ProposerMode::Random,
            ledger: LedgerConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            airlines: vec![
                "Meridian Air".to_string(),
                "Northwind".to_string(),
                "Blue Harbor".to_string(),
                "Coastal Jet".to_string(),
                "Polar Express".to_string(),
            ],
            flights: vec![
                FlightSpec {
                    airline: 0,
                    flight_number: "ND1309".to_string(),
                    departure_time: 1_700_000_000,
                },
                FlightSpec {
                    airline: 1,
                    flight_number: "NW0412".to_string(),
                    departure_time: 1_700_003_600,
                },
                FlightSpec {
                    airline: 4,
                    flight_number: "PX0077".to_string(),
                    departure_time: 1_700_007_200,
                },
            ],
            passengers: 6,
            premium: ledger.max_insurance,
            rounds: 5,
        }
    }
}
