//! End-to-end flows through the public ledger API

mod common;

use common::*;
use flight_surety_core::*;

#[test]
fn late_flight_credits_and_pays_passenger() {
    let mut ledger = ledger_fixed_index(4);

    ledger
        .pay_registration_fee(airline(1), REGISTRATION_FEE)
        .unwrap();
    let flight = ledger
        .register_flight(airline(1), FLIGHT, DEPARTURE)
        .unwrap()
        .into_value();
    ledger
        .buy_insurance(passenger(1), flight, units(1))
        .unwrap();

    register_oracles(&mut ledger, 0..3);
    for n in 0..3 {
        assert!(ledger.oracle_indexes(&oracle(n)).unwrap().contains(4));
    }

    let request = ledger
        .request_status_resolution(passenger(1), airline(1), FLIGHT, DEPARTURE)
        .unwrap();
    assert!(matches!(
        request.events[0].event,
        LedgerEvent::StatusResolutionRequested { index: 4, .. }
    ));

    for n in 0..3 {
        respond(&mut ledger, n, 4, StatusCode::LateAirline).unwrap();
    }

    assert_eq!(ledger.flight(&flight).unwrap().status.code(), 20);
    assert_eq!(ledger.credit_balance(&passenger(1)), units(1) * 3 / 2);

    let mut sink = CollectingSink::new();
    let paid = ledger.withdraw(passenger(1), &mut sink).unwrap().into_value();
    assert_eq!(paid, 1_500_000_000);
    assert_eq!(sink.total_to(&passenger(1)), paid);
    assert_eq!(ledger.credit_balance(&passenger(1)), 0);
    assert!(ledger.treasury().is_balanced());
}

#[test]
fn fifth_airline_admitted_on_second_vote() {
    let mut ledger = ledger_fixed_index(0);
    activate_founders(&mut ledger, 4);
    assert_eq!(ledger.registered_airline_count(), 4);

    let first = ledger
        .nominate_airline(airline(1), airline(5), "Airline 5")
        .unwrap()
        .into_value();
    assert!(!first.admitted);
    assert_eq!(first.votes_still_needed, 1);
    assert!(!ledger.is_airline_registered(&airline(5)));

    let second = ledger
        .nominate_airline(airline(2), airline(5), "Airline 5")
        .unwrap()
        .into_value();
    assert!(second.admitted);
    assert_eq!(second.votes_still_needed, 0);
    assert!(ledger.is_airline_registered(&airline(5)));
    assert_eq!(ledger.registered_airline_count(), 5);
}

#[test]
fn event_log_tracks_a_full_cycle() {
    let (mut ledger, flight) = ledger_with_flight(6);
    ledger.buy_insurance(passenger(1), flight, 10).unwrap();
    let cursor = ledger.next_event_seq();

    resolve(&mut ledger, 6, StatusCode::LateWeather);

    let events: Vec<&LedgerEvent> = ledger
        .events_since(cursor)
        .iter()
        .map(|sequenced| &sequenced.event)
        .collect();
    let finalized = events
        .iter()
        .filter(|event| matches!(event, LedgerEvent::FlightStatusFinalized { .. }))
        .count();
    let credited = events
        .iter()
        .filter(|event| matches!(event, LedgerEvent::PolicyCredited { credit: 15, .. }))
        .count();
    assert_eq!(finalized, 1);
    assert_eq!(credited, 1);

    let seqs: Vec<u64> = ledger.events_since(0).iter().map(|e| e.seq).collect();
    let expected: Vec<u64> = (0..seqs.len() as u64).collect();
    assert_eq!(seqs, expected);
}

#[test]
fn flights_listed_in_registration_order() {
    let mut ledger = ledger_fixed_index(0);
    activate_founders(&mut ledger, 2);
    let first = ledger
        .register_flight(airline(1), "ND1309", DEPARTURE)
        .unwrap()
        .into_value();
    let second = ledger
        .register_flight(airline(2), "ND1310", DEPARTURE)
        .unwrap()
        .into_value();

    let keys: Vec<FlightKey> = ledger.flights().map(|flight| flight.key).collect();
    assert_eq!(keys, vec![first, second]);
    assert_eq!(ledger.flight_by_id(2).unwrap().key, second);
    assert_eq!(
        ledger.flight(&FlightKey::derive(&airline(2), "ND1309", DEPARTURE)),
        Err(SuretyError::NotFound)
    );
}
