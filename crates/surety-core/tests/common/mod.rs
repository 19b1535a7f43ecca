//! Shared setup for ledger integration tests

#![allow(dead_code)]

use flight_surety_core::*;

pub const FLIGHT: &str = "ND1309";
pub const DEPARTURE: i64 = 10_002_000;

pub fn account(label: &str) -> AccountId {
    AccountId::from_seed(label)
}

pub fn owner() -> AccountId {
    account("owner")
}

pub fn airline(n: u32) -> AccountId {
    account(&format!("airline/{}", n))
}

pub fn oracle(n: u32) -> AccountId {
    account(&format!("oracle/{}", n))
}

pub fn passenger(n: u32) -> AccountId {
    account(&format!("passenger/{}", n))
}

pub fn ledger_with(config: LedgerConfig, script: Vec<u8>) -> Ledger {
    Ledger::new(
        config,
        owner(),
        airline(1),
        "Airline 1",
        Box::new(ScriptedIndexSource::new(script)),
    )
    .unwrap()
}

/// Default config; every drawn index is `index`
pub fn ledger_fixed_index(index: u8) -> Ledger {
    ledger_with(LedgerConfig::default(), vec![index])
}

/// Genesis pays, then nominates airlines 2..=count into founding seats and
/// each of them pays. Returns the active airlines.
pub fn activate_founders(ledger: &mut Ledger, count: u32) -> Vec<AccountId> {
    let fee = ledger.config().registration_fee;
    ledger.pay_registration_fee(airline(1), fee).unwrap();
    for n in 2..=count {
        let outcome = ledger
            .nominate_airline(airline(1), airline(n), &format!("Airline {}", n))
            .unwrap()
            .into_value();
        assert!(outcome.admitted && outcome.awaiting_fee);
        ledger.pay_registration_fee(airline(n), fee).unwrap();
    }
    (1..=count).map(airline).collect()
}

/// Active genesis airline with flight ND1309 registered
pub fn ledger_with_flight(index: u8) -> (Ledger, FlightKey) {
    let mut ledger = ledger_fixed_index(index);
    activate_founders(&mut ledger, 1);
    let key = ledger
        .register_flight(airline(1), FLIGHT, DEPARTURE)
        .unwrap()
        .into_value();
    (ledger, key)
}

pub fn register_oracles(ledger: &mut Ledger, range: std::ops::Range<u32>) {
    let fee = ledger.config().oracle_fee;
    for n in range {
        ledger.register_oracle(oracle(n), fee).unwrap();
    }
}

pub fn respond(
    ledger: &mut Ledger,
    n: u32,
    index: u8,
    status: StatusCode,
) -> SuretyResult<ResponseOutcome> {
    ledger
        .submit_oracle_response(oracle(n), index, airline(1), FLIGHT, DEPARTURE, status)
        .map(Receipt::into_value)
}

/// Drive the flight to `status` through three matching oracle responses
pub fn resolve(ledger: &mut Ledger, index: u8, status: StatusCode) {
    register_oracles(ledger, 100..103);
    ledger
        .request_status_resolution(passenger(0), airline(1), FLIGHT, DEPARTURE)
        .unwrap();
    for n in 100..103 {
        respond(ledger, n, index, status).unwrap();
    }
}
