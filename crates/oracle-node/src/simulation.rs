//! Self-contained run of the whole insurance cycle against an in-process
//! ledger: airlines join, flights are insured, the oracle node resolves
//! them and credited passengers withdraw.

use std::time::Duration;

use chrono::{DateTime, Utc};
use flight_surety_core::{
    AccountId, Amount, CollectingSink, FlightKey, IndexSource, Ledger, RandomIndexSource,
    Receipt, StatusCode, SuretyError, Treasury,
};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time;

use crate::client::InProcessLedger;
use crate::config::NodeConfig;
use crate::error::{NodeError, NodeResult};
use crate::node::{NodeStats, OracleNode};
use crate::proposer;

#[derive(Debug, Clone, Serialize)]
pub struct FlightReport {
    pub flight_number: String,
    pub airline: String,
    pub departure_time: i64,
    pub status: StatusCode,
    pub policies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutReport {
    pub passenger: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub registered_airlines: u32,
    pub oracles: usize,
    pub flights: Vec<FlightReport>,
    pub payouts: Vec<PayoutReport>,
    pub node: NodeStats,
    pub treasury: Treasury,
    pub events: u64,
}

impl SimulationReport {
    pub fn total_paid(&self) -> Amount {
        self.payouts.iter().map(|payout| payout.amount).sum()
    }

    pub fn log_summary(&self) {
        log::info!(
            "Simulation finished in {} ms",
            (self.finished_at - self.started_at).num_milliseconds()
        );
        log::info!(
            "{} airlines registered, {} oracles, {} events",
            self.registered_airlines,
            self.oracles,
            self.events
        );
        for flight in &self.flights {
            log::info!(
                "  {} ({}): {} with {} policies",
                flight.flight_number,
                flight.airline,
                flight.status,
                flight.policies
            );
        }
        log::info!(
            "{} payouts totalling {}; pool balance {}",
            self.payouts.len(),
            self.total_paid(),
            self.treasury.balance()
        );
    }
}

pub fn owner_account() -> AccountId {
    AccountId::from_seed("owner")
}

pub fn airline_account(n: usize) -> AccountId {
    AccountId::from_seed(&format!("airline/{}", n))
}

pub fn oracle_account(n: u32) -> AccountId {
    AccountId::from_seed(&format!("oracle/{}", n))
}

pub fn passenger_account(n: u32) -> AccountId {
    AccountId::from_seed(&format!("passenger/{}", n))
}

pub struct Simulation {
    config: NodeConfig,
}

impl Simulation {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Ledger with every configured airline active, every flight registered
    /// and every passenger insured
    pub fn bootstrap(&self) -> NodeResult<Ledger> {
        let source: Box<dyn IndexSource + Send> = match self.config.seed {
            Some(seed) => Box::new(RandomIndexSource::seeded(seed)),
            None => Box::new(RandomIndexSource::from_entropy()),
        };
        self.bootstrap_with(source)
    }

    pub fn bootstrap_with(&self, index_source: Box<dyn IndexSource + Send>) -> NodeResult<Ledger> {
        self.config.validate()?;
        let sim = &self.config.simulation;
        let fee = self.config.ledger.registration_fee;

        let genesis = airline_account(0);
        let mut ledger = Ledger::new(
            self.config.ledger.clone(),
            owner_account(),
            genesis,
            sim.airlines[0].as_str(),
            index_source,
        )?;
        ledger.pay_registration_fee(genesis, fee)?;

        let mut active = vec![genesis];
        for (n, name) in sim.airlines.iter().enumerate().skip(1) {
            let candidate = airline_account(n);
            admit(&mut ledger, &active, candidate, name)?;
            ledger.pay_registration_fee(candidate, fee)?;
            active.push(candidate);
        }

        let mut flights = Vec::with_capacity(sim.flights.len());
        for flight in &sim.flights {
            let key = ledger
                .register_flight(
                    airline_account(flight.airline),
                    &flight.flight_number,
                    flight.departure_time,
                )?
                .into_value();
            flights.push(key);
        }

        for n in 0..sim.passengers {
            let flight = flights[n as usize % flights.len()];
            ledger.buy_insurance(passenger_account(n), flight, sim.premium)?;
        }

        log::info!(
            "Bootstrapped {} airlines, {} flights, {} policies",
            ledger.registered_airline_count(),
            flights.len(),
            sim.passengers
        );
        Ok(ledger)
    }

    pub async fn run(&self) -> NodeResult<SimulationReport> {
        let ledger = self.bootstrap()?;
        self.run_with(ledger).await
    }

    /// Drive a bootstrapped ledger through oracle resolution and payout
    pub async fn run_with(&self, ledger: Ledger) -> NodeResult<SimulationReport> {
        let started_at = Utc::now();
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        let client = InProcessLedger::new(ledger);
        let shared = client.shared();

        let proposer = proposer::from_mode(self.config.proposer, self.config.seed)?;
        let mut node = OracleNode::new(client, proposer, self.config.broadcast);
        node.register(
            (0..self.config.oracle_count).map(oracle_account),
            self.config.ledger.oracle_fee,
        )
        .await?;
        let oracles = node.oracles().len();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(node.run(interval, shutdown_rx));

        for round in 1..=self.config.simulation.rounds {
            let pending = {
                let mut ledger = shared.lock().await;
                request_unresolved(&mut ledger)?
            };
            if pending == 0 {
                log::info!("All flights resolved after {} rounds", round - 1);
                break;
            }
            log::debug!("Round {}: {} flights awaiting resolution", round, pending);
            time::sleep(interval).await;
        }

        // Receiver gone means the node already stopped
        let _ = shutdown_tx.send(true);
        let node_stats = handle
            .await
            .map_err(|err| NodeError::Task(err.to_string()))??;

        let mut ledger = shared.lock().await;
        let payouts = withdraw_all(&mut ledger, self.config.simulation.passengers)?;

        let flights = ledger
            .flights()
            .map(|flight| FlightReport {
                flight_number: flight.flight_number.clone(),
                airline: ledger
                    .airline(&flight.airline)
                    .map(|airline| airline.name.clone())
                    .unwrap_or_default(),
                departure_time: flight.departure_time,
                status: flight.status,
                policies: ledger.state().escrow.policies_for_flight(&flight.key).len(),
            })
            .collect();

        Ok(SimulationReport {
            started_at,
            finished_at: Utc::now(),
            registered_airlines: ledger.registered_airline_count(),
            oracles,
            flights,
            payouts,
            node: node_stats,
            treasury: *ledger.treasury(),
            events: ledger.next_event_seq(),
        })
    }
}

/// Collect votes from active airlines until the candidate is admitted
fn admit(
    ledger: &mut Ledger,
    voters: &[AccountId],
    candidate: AccountId,
    name: &str,
) -> NodeResult<()> {
    for voter in voters {
        let outcome = ledger
            .nominate_airline(*voter, candidate, name)?
            .into_value();
        if outcome.admitted {
            return Ok(());
        }
    }
    Err(NodeError::invalid_config(format!(
        "airline {} could not gather enough votes",
        name
    )))
}

/// Ask for resolution of every flight still UNKNOWN; returns how many
fn request_unresolved(ledger: &mut Ledger) -> NodeResult<usize> {
    let pending: Vec<(FlightKey, AccountId, String, i64)> = ledger
        .flights()
        .filter(|flight| !flight.status.is_resolved())
        .map(|flight| {
            (
                flight.key,
                flight.airline,
                flight.flight_number.clone(),
                flight.departure_time,
            )
        })
        .collect();

    for (key, airline, flight_number, departure_time) in &pending {
        let receipt = ledger.request_status_resolution(
            owner_account(),
            *airline,
            flight_number,
            *departure_time,
        )?;
        log::debug!(
            "Resolution of {} requested at index {}",
            key,
            receipt.value.index
        );
    }

    Ok(pending.len())
}

fn withdraw_all(ledger: &mut Ledger, passengers: u32) -> NodeResult<Vec<PayoutReport>> {
    let mut sink = CollectingSink::new();
    for n in 0..passengers {
        let passenger = passenger_account(n);
        match ledger.withdraw(passenger, &mut sink).map(Receipt::into_value) {
            Ok(amount) => log::info!("Passenger {} withdrew {}", n, amount),
            Err(SuretyError::NothingOwed) => {}
            Err(err) => return Err(err.into()),
        }
    }

    Ok(sink
        .transfers()
        .iter()
        .map(|(passenger, amount)| PayoutReport {
            passenger: passenger.to_string(),
            amount: *amount,
        })
        .collect())
}
