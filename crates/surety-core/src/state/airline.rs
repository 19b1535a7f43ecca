//! Airline admission: founding seats gated by fee payment, later seats gated
//! by a vote of registered, fee-paid airlines.
//!
//! The vote threshold is `ceil(registered_count / 2)` evaluated at the moment
//! of each vote, so the requirement moves as airlines join mid-vote.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::LedgerConfig;
use crate::constants::admission_threshold;
use crate::errors::{SuretyError, SuretyResult};
use crate::events::LedgerEvent;
use crate::state::{OperationalGate, Treasury};
use crate::types::{AccountId, Amount};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Airline record, created on first nomination and never deleted
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct Airline {
    pub address: AccountId,
    pub name: String,
    pub paid_fee: bool,
    pub registered: bool,
    /// Holds one of the founding seats (admitted without a vote)
    pub founding_seat: bool,
    /// Distinct voters while pending
    pub votes: BTreeSet<AccountId>,
}

impl Airline {
    fn new(address: AccountId, name: String) -> Self {
        Self {
            address,
            name,
            paid_fee: false,
            registered: false,
            founding_seat: false,
            votes: BTreeSet::new(),
        }
    }

    /// Admission decided; nothing left to vote on
    pub fn is_admitted(&self) -> bool {
        self.registered || self.founding_seat
    }

    /// May nominate, vote and register flights
    pub fn is_active(&self) -> bool {
        self.registered && self.paid_fee
    }
}

/// Reported to the caller of every nomination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct AdmissionOutcome {
    pub airline: AccountId,
    /// No further votes are needed
    pub admitted: bool,
    pub votes_still_needed: u32,
    /// Founding-seat airline that becomes registered once it pays
    pub awaiting_fee: bool,
}

#[derive(Debug, Clone)]
pub struct AirlineRegistry {
    airlines: BTreeMap<AccountId, Airline>,
    /// Equals the number of records with `registered == true`
    registered_count: u32,
    founding_seats_granted: u32,
    founding_seats: u32,
    registration_fee: Amount,
}

impl AirlineRegistry {
    /// The genesis airline takes founding seat 1
    pub fn new(config: &LedgerConfig, genesis: AccountId, genesis_name: String) -> Self {
        let mut founder = Airline::new(genesis, genesis_name);
        founder.founding_seat = true;

        let mut airlines = BTreeMap::new();
        airlines.insert(genesis, founder);

        Self {
            airlines,
            registered_count: 0,
            founding_seats_granted: 1,
            founding_seats: config.founding_seats,
            registration_fee: config.registration_fee,
        }
    }

    pub fn airline(&self, address: &AccountId) -> Option<&Airline> {
        self.airlines.get(address)
    }

    pub fn airlines(&self) -> impl Iterator<Item = &Airline> {
        self.airlines.values()
    }

    pub fn is_registered(&self, address: &AccountId) -> bool {
        self.airlines.get(address).is_some_and(|a| a.registered)
    }

    pub fn is_active(&self, address: &AccountId) -> bool {
        self.airlines.get(address).is_some_and(Airline::is_active)
    }

    pub fn registered_count(&self) -> u32 {
        self.registered_count
    }

    pub fn founding_seats_granted(&self) -> u32 {
        self.founding_seats_granted
    }

    /// Distinct votes recorded for a candidate
    pub fn votes_for(&self, candidate: &AccountId) -> u32 {
        self.airlines
            .get(candidate)
            .map_or(0, |a| a.votes.len() as u32)
    }

    /// Nominate a candidate, or vote for it once founding seats are gone
    pub fn nominate(
        &mut self,
        gate: &OperationalGate,
        nominator: AccountId,
        candidate: AccountId,
        name: &str,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<AdmissionOutcome> {
        gate.ensure_operational()?;

        if !self.is_active(&nominator) {
            return Err(SuretyError::Unauthorized);
        }

        let existing = self.airlines.get(&candidate);
        if existing.is_some_and(Airline::is_admitted) {
            return Err(SuretyError::AlreadyRegistered);
        }

        let outcome = if existing.is_none() && self.founding_seats_granted < self.founding_seats {
            self.grant_founding_seat(candidate, name)
        } else {
            self.record_vote(nominator, candidate, name, events)?
        };

        events.push(LedgerEvent::AdmissionOutcome {
            airline: outcome.airline,
            admitted: outcome.admitted,
            votes_still_needed: outcome.votes_still_needed,
            awaiting_fee: outcome.awaiting_fee,
        });

        Ok(outcome)
    }

    fn grant_founding_seat(&mut self, candidate: AccountId, name: &str) -> AdmissionOutcome {
        let mut airline = Airline::new(candidate, name.to_string());
        airline.founding_seat = true;
        self.airlines.insert(candidate, airline);
        self.founding_seats_granted += 1;

        log::info!(
            "Founding seat {}/{} granted to {:?}",
            self.founding_seats_granted,
            self.founding_seats,
            candidate
        );

        AdmissionOutcome {
            airline: candidate,
            admitted: true,
            votes_still_needed: 0,
            awaiting_fee: true,
        }
    }

    fn record_vote(
        &mut self,
        voter: AccountId,
        candidate: AccountId,
        name: &str,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<AdmissionOutcome> {
        if self
            .airlines
            .get(&candidate)
            .is_some_and(|a| a.votes.contains(&voter))
        {
            return Err(SuretyError::DuplicateVote);
        }

        // Current count, not a snapshot from when the vote opened
        let threshold = admission_threshold(self.registered_count);

        let airline = self
            .airlines
            .entry(candidate)
            .or_insert_with(|| Airline::new(candidate, name.to_string()));
        airline.votes.insert(voter);
        let votes = airline.votes.len() as u32;

        let admitted = votes >= threshold;
        if admitted {
            airline.registered = true;
            self.registered_count += 1;
            events.push(LedgerEvent::AirlineRegistered {
                airline: candidate,
                registered_count: self.registered_count,
            });
            log::info!(
                "Airline {:?} admitted with {}/{} votes ({} registered)",
                candidate,
                votes,
                threshold,
                self.registered_count
            );
        } else {
            log::debug!(
                "Vote recorded for {:?}: {}/{} votes",
                candidate,
                votes,
                threshold
            );
        }

        Ok(AdmissionOutcome {
            airline: candidate,
            admitted,
            votes_still_needed: threshold.saturating_sub(votes),
            awaiting_fee: false,
        })
    }

    /// Pay the registration fee; activates a founding-seat airline
    pub fn pay_fee(
        &mut self,
        gate: &OperationalGate,
        treasury: &mut Treasury,
        payer: AccountId,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<()> {
        gate.ensure_operational()?;

        let airline = self
            .airlines
            .get_mut(&payer)
            .filter(|a| a.is_admitted())
            .ok_or(SuretyError::Unauthorized)?;

        if airline.paid_fee {
            return Err(SuretyError::FeeAlreadyPaid);
        }

        if amount != self.registration_fee {
            return Err(SuretyError::InsufficientFee);
        }

        treasury.deposit_airline_fee(amount)?;
        airline.paid_fee = true;
        events.push(LedgerEvent::AirlineFeePaid {
            airline: payer,
            amount,
        });

        if airline.founding_seat && !airline.registered {
            airline.registered = true;
            self.registered_count += 1;
            events.push(LedgerEvent::AirlineRegistered {
                airline: payer,
                registered_count: self.registered_count,
            });
            log::info!(
                "Founding airline {:?} registered ({} registered)",
                payer,
                self.registered_count
            );
        }

        Ok(())
    }
}
