//! # Oracle Consensus
//!
//! Per-flight resolution runs through four stages:
//!
//! 1. **Idle** - no request open for the flight
//! 2. **Requested** - an index is drawn and a request record opened; watchers
//!    key off the `StatusResolutionRequested` event
//! 3. **Collecting** - oracles holding the drawn index submit a status; valid
//!    responses are grouped by status code
//! 4. **Finalized** - the first status to reach quorum is written to the
//!    flight registry exactly once and every open request for that flight
//!    is closed
//!
//! Responses to a closed request are still recorded but never finalize
//! again. Requests have no expiry.
//!
//! This component draws indexes from the injected [`IndexSource`] and
//! aggregates externally proposed statuses; it holds no randomness itself.

use std::collections::BTreeMap;

use crate::config::LedgerConfig;
use crate::constants::INDEXES_PER_ORACLE;
use crate::errors::{SuretyError, SuretyResult};
use crate::events::LedgerEvent;
use crate::randomness::IndexSource;
use crate::state::{FlightRegistry, InsuranceEscrow, OperationalGate, Treasury};
use crate::types::{
    AccountId, Amount, FlightKey, IndexTriple, RequestKey, ResponseOutcome, StatusCode,
};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct Oracle {
    pub address: AccountId,
    pub indexes: IndexTriple,
}

/// One resolution round for a flight at a given index
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct OracleRequest {
    pub key: RequestKey,
    pub airline: AccountId,
    pub flight_number: String,
    pub timestamp: i64,
    pub requester: AccountId,
    pub open: bool,
    /// At most one response per oracle
    pub responses: BTreeMap<AccountId, StatusCode>,
    /// Responding oracles grouped by proposed status
    pub tallies: BTreeMap<StatusCode, Vec<AccountId>>,
    /// Status this request finalized, if it was the one to reach quorum
    pub finalized: Option<StatusCode>,
}

impl OracleRequest {
    fn new(
        key: RequestKey,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
        requester: AccountId,
    ) -> Self {
        Self {
            key,
            airline,
            flight_number: flight_number.to_string(),
            timestamp,
            requester,
            open: true,
            responses: BTreeMap::new(),
            tallies: BTreeMap::new(),
            finalized: None,
        }
    }

    /// Responses recorded for `status`
    pub fn matching(&self, status: StatusCode) -> u32 {
        self.tallies.get(&status).map_or(0, |oracles| oracles.len() as u32)
    }
}

#[derive(Debug, Clone)]
pub struct OracleConsensus {
    oracles: BTreeMap<AccountId, Oracle>,
    requests: BTreeMap<RequestKey, OracleRequest>,
    oracle_fee: Amount,
    quorum: u32,
    index_space: u8,
}

impl OracleConsensus {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            oracles: BTreeMap::new(),
            requests: BTreeMap::new(),
            oracle_fee: config.oracle_fee,
            quorum: config.quorum,
            index_space: config.oracle_index_space,
        }
    }

    pub fn oracle(&self, account: &AccountId) -> Option<&Oracle> {
        self.oracles.get(account)
    }

    pub fn oracle_indexes(&self, account: &AccountId) -> SuretyResult<IndexTriple> {
        self.oracles
            .get(account)
            .map(|oracle| oracle.indexes)
            .ok_or(SuretyError::NotFound)
    }

    pub fn oracle_count(&self) -> usize {
        self.oracles.len()
    }

    pub fn request(&self, key: &RequestKey) -> Option<&OracleRequest> {
        self.requests.get(key)
    }

    /// All requests ever opened for a flight, by index
    pub fn requests_for(&self, flight: &FlightKey) -> impl Iterator<Item = &OracleRequest> {
        self.requests
            .range(RequestKey::new(*flight, 0)..=RequestKey::new(*flight, u8::MAX))
            .map(|(_, request)| request)
    }

    pub fn open_requests(&self) -> impl Iterator<Item = &OracleRequest> {
        self.requests.values().filter(|request| request.open)
    }

    /// Register an oracle and assign its index triple. Indexes are drawn
    /// independently and may repeat.
    pub fn register_oracle(
        &mut self,
        gate: &OperationalGate,
        treasury: &mut Treasury,
        index_source: &mut dyn IndexSource,
        account: AccountId,
        fee: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<IndexTriple> {
        gate.ensure_operational()?;

        if self.oracles.contains_key(&account) {
            return Err(SuretyError::AlreadyRegistered);
        }

        if fee < self.oracle_fee {
            return Err(SuretyError::InsufficientFee);
        }

        treasury.deposit_oracle_fee(fee)?;

        let mut drawn = [0u8; INDEXES_PER_ORACLE];
        for slot in drawn.iter_mut() {
            *slot = index_source.next_index(self.index_space);
        }
        let indexes = IndexTriple(drawn);

        self.oracles.insert(
            account,
            Oracle {
                address: account,
                indexes,
            },
        );
        events.push(LedgerEvent::OracleRegistered {
            oracle: account,
            indexes,
        });
        log::debug!("Oracle {:?} registered with indexes {:?}", account, indexes.0);

        Ok(indexes)
    }

    /// Open (or re-announce) a resolution request for an unresolved flight
    #[allow(clippy::too_many_arguments)]
    pub fn request_status(
        &mut self,
        gate: &OperationalGate,
        flights: &FlightRegistry,
        index_source: &mut dyn IndexSource,
        requester: AccountId,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<RequestKey> {
        gate.ensure_operational()?;

        let flight_key = FlightKey::derive(&airline, flight_number, timestamp);
        let flight = flights.get(&flight_key)?;
        if flight.status.is_resolved() {
            return Err(SuretyError::FlightAlreadyResolved);
        }

        let index = index_source.next_index(self.index_space);
        let key = RequestKey::new(flight_key, index);

        match self.requests.get(&key) {
            Some(request) if request.open => {
                log::debug!(
                    "Request for {} at index {} already open, re-announcing",
                    flight_number,
                    index
                );
            }
            // A closed round at this index (e.g. one that settled on UNKNOWN)
            // restarts from scratch
            _ => {
                self.requests.insert(
                    key,
                    OracleRequest::new(key, airline, flight_number, timestamp, requester),
                );
                log::info!(
                    "Status resolution requested for {} at index {}",
                    flight_number,
                    index
                );
            }
        }

        events.push(LedgerEvent::StatusResolutionRequested {
            index,
            airline,
            flight_number: flight_number.to_string(),
            timestamp,
        });

        Ok(key)
    }

    /// Validate and record one oracle response; finalizes the flight on the
    /// response that brings a status to quorum.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_response(
        &mut self,
        gate: &OperationalGate,
        flights: &mut FlightRegistry,
        escrow: &mut InsuranceEscrow,
        oracle: AccountId,
        index: u8,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
        status: StatusCode,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<ResponseOutcome> {
        gate.ensure_operational()?;

        let assigned = self
            .oracles
            .get(&oracle)
            .map(|registered| registered.indexes)
            .ok_or(SuretyError::Unauthorized)?;
        if !assigned.contains(index) {
            return Err(SuretyError::IndexMismatch);
        }

        let key = RequestKey::new(FlightKey::derive(&airline, flight_number, timestamp), index);
        let request = self.requests.get(&key).ok_or(SuretyError::NotFound)?;
        if request.responses.contains_key(&oracle) {
            return Err(SuretyError::AlreadyResponded);
        }

        let matching = request.matching(status) + 1;
        let finalize = request.open && matching >= self.quorum;

        events.push(LedgerEvent::OracleResponseRecorded {
            index,
            airline,
            flight_number: flight_number.to_string(),
            timestamp,
            oracle,
            status,
        });

        // Status write happens first; if it fails the request stays untouched
        if finalize {
            flights.apply_status(&key.flight, status, escrow, events)?;
        }

        if let Some(request) = self.requests.get_mut(&key) {
            request.responses.insert(oracle, status);
            request.tallies.entry(status).or_default().push(oracle);
            if finalize {
                request.finalized = Some(status);
            }
        }

        if finalize {
            self.close_requests_for(&key.flight);
            log::info!(
                "Flight {} finalized as {} after {} matching responses",
                flight_number,
                status,
                matching
            );
        } else {
            log::debug!(
                "Response from {:?} for {} at index {}: {} ({} matching)",
                oracle,
                flight_number,
                index,
                status,
                matching
            );
        }

        Ok(ResponseOutcome {
            request: key,
            matching,
            finalized: finalize.then_some(status),
        })
    }

    fn close_requests_for(&mut self, flight: &FlightKey) {
        let range = RequestKey::new(*flight, 0)..=RequestKey::new(*flight, u8::MAX);
        for (_, request) in self.requests.range_mut(range) {
            request.open = false;
        }
    }
}
