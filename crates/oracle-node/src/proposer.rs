//! Status proposals made on behalf of simulated oracles. The ledger only
//! aggregates what these return.

use flight_surety_core::StatusCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ProposerMode;
use crate::error::NodeResult;
use crate::node::StatusRequest;

pub trait StatusProposer: Send {
    fn propose(&mut self, request: &StatusRequest) -> StatusCode;
}

/// Uniform over every status code, UNKNOWN included
#[derive(Debug, Clone)]
pub struct RandomStatusProposer {
    rng: StdRng,
}

impl RandomStatusProposer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl StatusProposer for RandomStatusProposer {
    fn propose(&mut self, _request: &StatusRequest) -> StatusCode {
        StatusCode::ALL[self.rng.gen_range(0..StatusCode::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedStatusProposer {
    status: StatusCode,
}

impl FixedStatusProposer {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }
}

impl StatusProposer for FixedStatusProposer {
    fn propose(&mut self, _request: &StatusRequest) -> StatusCode {
        self.status
    }
}

/// Build the proposer selected in configuration
pub fn from_mode(mode: ProposerMode, seed: Option<u64>) -> NodeResult<Box<dyn StatusProposer>> {
    Ok(match mode {
        ProposerMode::Random => Box::new(RandomStatusProposer::new(seed)),
        ProposerMode::Fixed(code) => Box::new(FixedStatusProposer::new(StatusCode::try_from(code)?)),
    })
}
