//! # Ledger
//!
//! Transaction boundary over [`LedgerState`]. Each mutating call is applied
//! in full or not at all: components validate before they write, and the
//! events a call produces are appended to the [`EventLog`] only when it
//! succeeds.
//!
//! `withdraw` is the one call that leaves the ledger mid-transaction. The
//! passenger's credit is debited and logged before the [`PayoutSink`] runs,
//! and the sink may re-enter the ledger. If the sink fails, only that debit
//! is reversed and a compensating event is appended; transactions the sink
//! committed in between keep their effects and their receipts.

use crate::config::LedgerConfig;
use crate::errors::{SuretyError, SuretyResult};
use crate::events::{EventLog, LedgerEvent, Receipt, SequencedEvent};
use crate::payout::PayoutSink;
use crate::randomness::{IndexSource, RandomIndexSource};
use crate::state::{
    AdmissionOutcome, Airline, Flight, InsurancePolicy, LedgerState, OracleRequest, Treasury,
};
use crate::types::*;

pub struct Ledger {
    state: LedgerState,
    events: EventLog,
    index_source: Box<dyn IndexSource + Send>,
    config: LedgerConfig,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("state", &self.state)
            .field("events", &self.events.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create a ledger owned by `owner`, with `genesis` holding the first
    /// founding seat. The gate starts operational.
    pub fn new(
        config: LedgerConfig,
        owner: AccountId,
        genesis: AccountId,
        genesis_name: impl Into<String>,
        index_source: Box<dyn IndexSource + Send>,
    ) -> SuretyResult<Self> {
        config.validate()?;

        let state = LedgerState::new(&config, owner, genesis, genesis_name.into());
        log::info!(
            "Ledger created: owner {:?}, genesis airline {:?}",
            owner,
            genesis
        );

        Ok(Self {
            state,
            events: EventLog::new(),
            index_source,
            config,
        })
    }

    /// Same as [`Ledger::new`] with an entropy-seeded index source
    pub fn with_random_indexes(
        config: LedgerConfig,
        owner: AccountId,
        genesis: AccountId,
        genesis_name: impl Into<String>,
    ) -> SuretyResult<Self> {
        Self::new(
            config,
            owner,
            genesis,
            genesis_name,
            Box::new(RandomIndexSource::from_entropy()),
        )
    }

    fn commit<T>(&mut self, value: T, events: Vec<LedgerEvent>) -> Receipt<T> {
        let events = self.events.append(events);
        Receipt { value, events }
    }

    // ========================================================================
    // Mutating calls
    // ========================================================================

    pub fn set_operational_state(
        &mut self,
        caller: AccountId,
        operational: bool,
    ) -> SuretyResult<Receipt<()>> {
        let mut events = Vec::new();
        self.state
            .gate
            .set_operational_state(caller, operational, &mut events)?;
        Ok(self.commit((), events))
    }

    pub fn nominate_airline(
        &mut self,
        nominator: AccountId,
        candidate: AccountId,
        name: &str,
    ) -> SuretyResult<Receipt<AdmissionOutcome>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let outcome = state
            .airlines
            .nominate(&state.gate, nominator, candidate, name, &mut events)?;
        Ok(self.commit(outcome, events))
    }

    pub fn pay_registration_fee(
        &mut self,
        airline: AccountId,
        amount: Amount,
    ) -> SuretyResult<Receipt<()>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        state
            .airlines
            .pay_fee(&state.gate, &mut state.treasury, airline, amount, &mut events)?;
        Ok(self.commit((), events))
    }

    pub fn register_flight(
        &mut self,
        airline: AccountId,
        flight_number: &str,
        departure_time: i64,
    ) -> SuretyResult<Receipt<FlightKey>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let key = state.flights.register(
            &state.gate,
            &state.airlines,
            airline,
            flight_number,
            departure_time,
            &mut events,
        )?;
        Ok(self.commit(key, events))
    }

    pub fn request_status_resolution(
        &mut self,
        requester: AccountId,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
    ) -> SuretyResult<Receipt<RequestKey>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let key = state.oracles.request_status(
            &state.gate,
            &state.flights,
            self.index_source.as_mut(),
            requester,
            airline,
            flight_number,
            timestamp,
            &mut events,
        )?;
        Ok(self.commit(key, events))
    }

    pub fn register_oracle(
        &mut self,
        account: AccountId,
        fee: Amount,
    ) -> SuretyResult<Receipt<IndexTriple>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let indexes = state.oracles.register_oracle(
            &state.gate,
            &mut state.treasury,
            self.index_source.as_mut(),
            account,
            fee,
            &mut events,
        )?;
        Ok(self.commit(indexes, events))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn submit_oracle_response(
        &mut self,
        oracle: AccountId,
        index: u8,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
        status: StatusCode,
    ) -> SuretyResult<Receipt<ResponseOutcome>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let outcome = state.oracles.submit_response(
            &state.gate,
            &mut state.flights,
            &mut state.escrow,
            oracle,
            index,
            airline,
            flight_number,
            timestamp,
            status,
            &mut events,
        )?;
        Ok(self.commit(outcome, events))
    }

    pub fn buy_insurance(
        &mut self,
        passenger: AccountId,
        flight: FlightKey,
        amount: Amount,
    ) -> SuretyResult<Receipt<PolicyId>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let policy = state.escrow.buy(
            &state.gate,
            &state.flights,
            &mut state.treasury,
            passenger,
            flight,
            amount,
            &mut events,
        )?;
        Ok(self.commit(policy, events))
    }

    /// Withdraw the passenger's whole credit balance through `sink`.
    ///
    /// Internal debit happens first, so a sink that re-enters `withdraw`
    /// for the same passenger sees a zero balance and gets `NothingOwed`.
    /// A failed transfer appends `WithdrawalReverted` and makes the credit
    /// withdrawable again.
    pub fn withdraw(
        &mut self,
        passenger: AccountId,
        sink: &mut dyn PayoutSink,
    ) -> SuretyResult<Receipt<Amount>> {
        let mut events = Vec::new();
        let state = &mut self.state;
        let settlement = state.escrow.settle_withdrawal(
            &state.gate,
            &mut state.treasury,
            passenger,
            &mut events,
        )?;
        let amount = settlement.amount;
        let receipt = self.commit(amount, events);

        if let Err(err) = sink.transfer(self, passenger, amount) {
            let mut events = Vec::new();
            let state = &mut self.state;
            state
                .escrow
                .revert_withdrawal(&mut state.treasury, &settlement, &mut events)?;
            self.events.append(events);
            log::warn!(
                "Payout of {} to {:?} failed, withdrawal reverted: {}",
                amount,
                passenger,
                err
            );
            return Err(SuretyError::TransferFailed(err.to_string()));
        }

        Ok(receipt)
    }

    // ========================================================================
    // Read calls
    // ========================================================================

    pub fn is_operational(&self) -> bool {
        self.state.gate.is_operational()
    }

    pub fn owner(&self) -> AccountId {
        self.state.gate.owner()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn flight(&self, key: &FlightKey) -> SuretyResult<&Flight> {
        self.state.flights.get(key)
    }

    pub fn flight_by_id(&self, id: u64) -> SuretyResult<&Flight> {
        self.state.flights.get_by_id(id)
    }

    /// Flights in registration order
    pub fn flights(&self) -> impl Iterator<Item = &Flight> {
        self.state.flights.iter()
    }

    pub fn oracle_indexes(&self, account: &AccountId) -> SuretyResult<IndexTriple> {
        self.state.oracles.oracle_indexes(account)
    }

    pub fn request(&self, key: &RequestKey) -> Option<&OracleRequest> {
        self.state.oracles.request(key)
    }

    pub fn credit_balance(&self, passenger: &AccountId) -> Amount {
        self.state.escrow.credit_balance(passenger)
    }

    pub fn is_airline_registered(&self, account: &AccountId) -> bool {
        self.state.airlines.is_registered(account)
    }

    pub fn registered_airline_count(&self) -> u32 {
        self.state.airlines.registered_count()
    }

    pub fn airline(&self, account: &AccountId) -> Option<&Airline> {
        self.state.airlines.airline(account)
    }

    pub fn votes_for(&self, candidate: &AccountId) -> u32 {
        self.state.airlines.votes_for(candidate)
    }

    pub fn policy(&self, id: PolicyId) -> SuretyResult<&InsurancePolicy> {
        self.state.escrow.policy(id)
    }

    pub fn policies_of(&self, passenger: &AccountId) -> Vec<&InsurancePolicy> {
        self.state.escrow.policies_of(passenger)
    }

    pub fn treasury(&self) -> &Treasury {
        &self.state.treasury
    }

    /// Events with `seq >= cursor`
    pub fn events_since(&self, cursor: u64) -> &[SequencedEvent] {
        self.events.since(cursor)
    }

    pub fn next_event_seq(&self) -> u64 {
        self.events.next_seq()
    }
}
