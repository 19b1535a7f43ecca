//! Insurance purchase, crediting and withdrawal, including a payout
//! recipient that calls back into the ledger

mod common;

use common::*;
use flight_surety_core::*;

/// Re-enters `withdraw` for the same passenger from inside the transfer
#[derive(Default)]
struct ReentrantSink {
    received: Amount,
    depth: u32,
    reentries: Vec<SuretyResult<Amount>>,
}

impl PayoutSink for ReentrantSink {
    fn transfer(
        &mut self,
        ledger: &mut Ledger,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), PayoutError> {
        self.received += amount;
        if self.depth < 3 {
            self.depth += 1;
            let result = ledger.withdraw(to, self).map(Receipt::into_value);
            self.reentries.push(result);
        }
        Ok(())
    }
}

struct RejectingSink;

impl PayoutSink for RejectingSink {
    fn transfer(
        &mut self,
        _ledger: &mut Ledger,
        to: AccountId,
        _amount: Amount,
    ) -> Result<(), PayoutError> {
        Err(PayoutError::Rejected(format!("{:?} has no receiving account", to)))
    }
}

/// Withdraws for another passenger from inside the transfer, then fails
struct CrossWithdrawSink {
    other: AccountId,
    inner: CollectingSink,
    nested: Option<SuretyResult<Receipt<Amount>>>,
}

impl CrossWithdrawSink {
    fn new(other: AccountId) -> Self {
        Self {
            other,
            inner: CollectingSink::new(),
            nested: None,
        }
    }
}

impl PayoutSink for CrossWithdrawSink {
    fn transfer(
        &mut self,
        ledger: &mut Ledger,
        _to: AccountId,
        _amount: Amount,
    ) -> Result<(), PayoutError> {
        self.nested = Some(ledger.withdraw(self.other, &mut self.inner));
        Err(PayoutError::Unavailable)
    }
}

fn credited_ledger(premiums: &[(u32, Amount)]) -> (Ledger, FlightKey) {
    let (mut ledger, flight) = ledger_with_flight(1);
    for (n, premium) in premiums {
        ledger.buy_insurance(passenger(*n), flight, *premium).unwrap();
    }
    resolve(&mut ledger, 1, StatusCode::LateOther);
    (ledger, flight)
}

#[test]
fn cap_is_inclusive() {
    let (mut ledger, flight) = ledger_with_flight(0);
    assert_eq!(
        ledger.buy_insurance(passenger(1), flight, MAX_INSURANCE + 1),
        Err(SuretyError::CapExceeded)
    );
    assert!(ledger.buy_insurance(passenger(1), flight, MAX_INSURANCE).is_ok());
    assert_eq!(
        ledger.buy_insurance(passenger(1), flight, 0),
        Err(SuretyError::ZeroAmount)
    );
    assert_eq!(
        ledger.buy_insurance(passenger(1), FlightKey([0; 32]), 1),
        Err(SuretyError::NotFound)
    );
}

#[test]
fn credit_is_floored() {
    let (ledger, _) = credited_ledger(&[(1, 1), (2, 3), (3, 7)]);
    assert_eq!(ledger.credit_balance(&passenger(1)), 1);
    assert_eq!(ledger.credit_balance(&passenger(2)), 4);
    assert_eq!(ledger.credit_balance(&passenger(3)), 10);
}

#[test]
fn balance_aggregates_policies() {
    let (ledger, _) = credited_ledger(&[(1, 100), (1, 200)]);
    assert_eq!(ledger.credit_balance(&passenger(1)), 450);
    let policies = ledger.policies_of(&passenger(1));
    assert_eq!(policies.len(), 2);
    assert!(policies.iter().all(|p| p.state == PolicyState::Credited));
}

#[test]
fn on_time_resolution_credits_nothing() {
    let (mut ledger, flight) = ledger_with_flight(1);
    let policy = ledger
        .buy_insurance(passenger(1), flight, MAX_INSURANCE)
        .unwrap()
        .into_value();
    resolve(&mut ledger, 1, StatusCode::OnTime);

    assert_eq!(ledger.credit_balance(&passenger(1)), 0);
    assert_eq!(ledger.policy(policy).unwrap().state, PolicyState::Active);

    let mut sink = CollectingSink::new();
    assert_eq!(
        ledger.withdraw(passenger(1), &mut sink),
        Err(SuretyError::NothingOwed)
    );
    assert!(sink.transfers().is_empty());
}

#[test]
fn second_withdrawal_finds_nothing() {
    let (mut ledger, _) = credited_ledger(&[(1, MAX_INSURANCE)]);
    let mut sink = CollectingSink::new();

    let first = ledger.withdraw(passenger(1), &mut sink).unwrap();
    assert_eq!(first.value, MAX_INSURANCE * 3 / 2);
    assert_eq!(
        ledger.withdraw(passenger(1), &mut sink),
        Err(SuretyError::NothingOwed)
    );
    assert_eq!(sink.total(), MAX_INSURANCE * 3 / 2);

    for policy in ledger.policies_of(&passenger(1)) {
        assert_eq!(policy.state, PolicyState::Paid);
    }
}

#[test]
fn reentrant_withdrawal_cannot_double_spend() {
    let (mut ledger, _) = credited_ledger(&[(1, MAX_INSURANCE), (2, MAX_INSURANCE)]);
    let owed = ledger.credit_balance(&passenger(1));
    let before = ledger.treasury().balance();

    let mut sink = ReentrantSink::default();
    let receipt = ledger.withdraw(passenger(1), &mut sink).unwrap();

    assert_eq!(receipt.value, owed);
    assert_eq!(sink.received, owed);
    assert_eq!(sink.reentries, vec![Err(SuretyError::NothingOwed)]);
    assert_eq!(ledger.credit_balance(&passenger(1)), 0);
    assert_eq!(ledger.treasury().balance(), before - owed);
    assert_eq!(ledger.credit_balance(&passenger(2)), owed);
    assert!(ledger.treasury().is_balanced());
}

#[test]
fn rejected_transfer_restores_credit() {
    let (mut ledger, _) = credited_ledger(&[(1, MAX_INSURANCE)]);
    let owed = ledger.credit_balance(&passenger(1));
    let cursor = ledger.next_event_seq();

    let result = ledger.withdraw(passenger(1), &mut RejectingSink);
    assert!(matches!(result, Err(SuretyError::TransferFailed(_))));
    assert_eq!(ledger.credit_balance(&passenger(1)), owed);
    assert_eq!(ledger.treasury().paid_out(), 0);
    assert!(ledger.treasury().is_balanced());
    for policy in ledger.policies_of(&passenger(1)) {
        assert_eq!(policy.state, PolicyState::Credited);
    }

    let appended = ledger.events_since(cursor);
    assert_eq!(appended.len(), 2);
    assert_eq!(
        appended[1].event,
        LedgerEvent::WithdrawalReverted {
            passenger: passenger(1),
            amount: owed,
        }
    );

    let mut sink = CollectingSink::new();
    assert_eq!(ledger.withdraw(passenger(1), &mut sink).unwrap().value, owed);
    assert_eq!(sink.total(), owed);
}

#[test]
fn failed_transfer_keeps_nested_withdrawal() {
    let (mut ledger, _) = credited_ledger(&[(1, MAX_INSURANCE), (2, MAX_INSURANCE)]);
    let owed = ledger.credit_balance(&passenger(1));
    let escrowed = ledger.credit_balance(&passenger(1)) + ledger.credit_balance(&passenger(2));

    let mut sink = CrossWithdrawSink::new(passenger(2));
    let result = ledger.withdraw(passenger(1), &mut sink);
    assert!(matches!(result, Err(SuretyError::TransferFailed(_))));

    // The nested withdrawal committed and stays committed
    let nested = sink.nested.take().unwrap().unwrap();
    assert_eq!(nested.value, owed);
    assert_eq!(ledger.credit_balance(&passenger(2)), 0);
    assert_eq!(ledger.events_since(nested.events[0].seq)[0], nested.events[0]);
    assert_eq!(
        ledger.withdraw(passenger(2), &mut sink.inner),
        Err(SuretyError::NothingOwed)
    );

    // Only the outer debit is reversed
    assert_eq!(ledger.credit_balance(&passenger(1)), owed);
    let mut retry = CollectingSink::new();
    ledger.withdraw(passenger(1), &mut retry).unwrap();

    let transferred = sink.inner.total() + retry.total();
    assert_eq!(transferred, escrowed);
    assert_eq!(ledger.treasury().paid_out(), escrowed);
    assert!(ledger.treasury().is_balanced());
}

#[test]
fn payout_bounded_by_pool() {
    let config = LedgerConfig {
        registration_fee: 1,
        oracle_fee: 1,
        quorum: 1,
        max_insurance: 10,
        ..LedgerConfig::default()
    };
    let mut ledger = ledger_with(config, vec![0]);
    activate_founders(&mut ledger, 1);
    let flight = ledger
        .register_flight(airline(1), FLIGHT, DEPARTURE)
        .unwrap()
        .into_value();
    ledger.buy_insurance(passenger(1), flight, 10).unwrap();
    ledger.register_oracle(oracle(0), 1).unwrap();
    ledger
        .request_status_resolution(passenger(1), airline(1), FLIGHT, DEPARTURE)
        .unwrap();
    respond(&mut ledger, 0, 0, StatusCode::LateAirline).unwrap();

    // Pool holds 1 + 1 + 10 but 15 is owed
    assert_eq!(ledger.treasury().balance(), 12);
    assert_eq!(ledger.credit_balance(&passenger(1)), 15);
    assert_eq!(
        ledger.withdraw(passenger(1), &mut CollectingSink::new()),
        Err(SuretyError::InsufficientPoolBalance)
    );
    assert_eq!(ledger.credit_balance(&passenger(1)), 15);
}

#[test]
fn paused_ledger_blocks_withdrawal() {
    let (mut ledger, _) = credited_ledger(&[(1, MAX_INSURANCE)]);
    ledger.set_operational_state(owner(), false).unwrap();
    assert_eq!(
        ledger.withdraw(passenger(1), &mut CollectingSink::new()),
        Err(SuretyError::NotOperational)
    );
}
