//! Flights registered by active airlines. The status code has a single
//! mutation point, [`FlightRegistry::apply_status`], driven by oracle
//! consensus; applying a LATE_* status credits the flight's policies.

use std::collections::BTreeMap;

use crate::errors::{SuretyError, SuretyResult};
use crate::events::LedgerEvent;
use crate::state::{AirlineRegistry, InsuranceEscrow, OperationalGate};
use crate::types::{AccountId, FlightKey, StatusCode};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct Flight {
    pub key: FlightKey,
    /// Sequential id, starting at 1
    pub id: u64,
    pub airline: AccountId,
    pub flight_number: String,
    pub departure_time: i64,
    pub status: StatusCode,
    pub registered: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, Flight>,
    /// Keys in registration order; id `n` is at position `n - 1`
    order: Vec<FlightKey>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        gate: &OperationalGate,
        airlines: &AirlineRegistry,
        airline: AccountId,
        flight_number: &str,
        departure_time: i64,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<FlightKey> {
        gate.ensure_operational()?;

        if !airlines.is_active(&airline) {
            return Err(SuretyError::Unauthorized);
        }

        let key = FlightKey::derive(&airline, flight_number, departure_time);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::AlreadyRegistered);
        }

        let id = self.order.len() as u64 + 1;
        self.flights.insert(
            key,
            Flight {
                key,
                id,
                airline,
                flight_number: flight_number.to_string(),
                departure_time,
                status: StatusCode::Unknown,
                registered: true,
            },
        );
        self.order.push(key);

        events.push(LedgerEvent::FlightRegistered {
            key,
            airline,
            flight_number: flight_number.to_string(),
            departure_time,
        });
        log::info!("Flight {} registered as #{} ({:?})", flight_number, id, key);

        Ok(key)
    }

    pub fn get(&self, key: &FlightKey) -> SuretyResult<&Flight> {
        self.flights.get(key).ok_or(SuretyError::NotFound)
    }

    pub fn get_by_id(&self, id: u64) -> SuretyResult<&Flight> {
        let position = id.checked_sub(1).ok_or(SuretyError::NotFound)? as usize;
        let key = self.order.get(position).ok_or(SuretyError::NotFound)?;
        self.get(key)
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    /// Flights in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.order.iter().filter_map(|key| self.flights.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sole mutation point for a flight's status. Reapplying the same status
    /// changes nothing except re-notifying escrow, which only credits
    /// still-active policies.
    pub(crate) fn apply_status(
        &mut self,
        key: &FlightKey,
        status: StatusCode,
        escrow: &mut InsuranceEscrow,
        events: &mut Vec<LedgerEvent>,
    ) -> SuretyResult<()> {
        let flight = self.flights.get_mut(key).ok_or(SuretyError::NotFound)?;

        // Computed before any write so an overflow leaves both tables untouched
        let credits = escrow.prepare_credits(key, status)?;

        if flight.status != status {
            log::info!(
                "Flight {} status {} -> {}",
                flight.flight_number,
                flight.status,
                status
            );
        }
        flight.status = status;
        events.push(LedgerEvent::FlightStatusFinalized { key: *key, status });

        escrow.apply_credits(credits, events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::constants::REGISTRATION_FEE;
    use crate::state::Treasury;

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    fn setup() -> (FlightRegistry, AirlineRegistry, OperationalGate) {
        let gate = OperationalGate::new(account(0));
        let mut airlines = AirlineRegistry::new(&LedgerConfig::default(), account(1), "First".into());
        let mut treasury = Treasury::default();
        airlines
            .pay_fee(&gate, &mut treasury, account(1), REGISTRATION_FEE, &mut Vec::new())
            .unwrap();
        (FlightRegistry::new(), airlines, gate)
    }

    #[test]
    fn test_register_and_lookup() {
        let (mut flights, airlines, gate) = setup();
        let mut events = Vec::new();

        let key = flights
            .register(&gate, &airlines, account(1), "ND1309", 10_002_000, &mut events)
            .unwrap();

        let flight = flights.get(&key).unwrap();
        assert_eq!(flight.status, StatusCode::Unknown);
        assert_eq!(flight.id, 1);
        assert!(flight.registered);
        assert_eq!(flights.get_by_id(1).unwrap().key, key);
        assert_eq!(flights.get_by_id(0), Err(SuretyError::NotFound));
        assert_eq!(flights.get_by_id(2), Err(SuretyError::NotFound));
        assert!(matches!(events[0], LedgerEvent::FlightRegistered { .. }));
    }

    #[test]
    fn test_duplicate_flight_rejected() {
        let (mut flights, airlines, gate) = setup();
        let mut events = Vec::new();
        flights
            .register(&gate, &airlines, account(1), "ND1309", 10_002_000, &mut events)
            .unwrap();

        let result = flights.register(&gate, &airlines, account(1), "ND1309", 10_002_000, &mut events);
        assert_eq!(result, Err(SuretyError::AlreadyRegistered));
        assert_eq!(flights.len(), 1);
    }

    #[test]
    fn test_inactive_airline_cannot_register() {
        let (mut flights, airlines, gate) = setup();
        let result = flights.register(&gate, &airlines, account(7), "XX1", 1, &mut Vec::new());
        assert_eq!(result, Err(SuretyError::Unauthorized));
        assert!(flights.is_empty());
    }

    #[test]
    fn test_apply_status_unknown_flight() {
        let (mut flights, _, _) = setup();
        let mut escrow = InsuranceEscrow::new(&LedgerConfig::default());
        let result = flights.apply_status(
            &FlightKey([9; 32]),
            StatusCode::LateAirline,
            &mut escrow,
            &mut Vec::new(),
        );
        assert_eq!(result, Err(SuretyError::NotFound));
    }
}
