//! Oracle watcher: follows the ledger event log and answers status
//! resolution requests for the oracles it runs.

use std::time::Duration;

use flight_surety_core::{AccountId, Amount, IndexTriple, LedgerEvent};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time;

use crate::client::LedgerClient;
use crate::error::NodeResult;
use crate::proposer::StatusProposer;

/// A resolution request as announced in the event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub index: u8,
    pub airline: AccountId,
    pub flight_number: String,
    pub timestamp: i64,
}

impl StatusRequest {
    pub fn from_event(event: &LedgerEvent) -> Option<Self> {
        match event {
            LedgerEvent::StatusResolutionRequested {
                index,
                airline,
                flight_number,
                timestamp,
            } => Some(Self {
                index: *index,
                airline: *airline,
                flight_number: flight_number.clone(),
                timestamp: *timestamp,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub polls: u64,
    pub requests_seen: u64,
    pub responses_submitted: u64,
    /// Index mismatches and repeat answers
    pub responses_rejected: u64,
    pub finalized: u64,
    pub errors: u64,
}

pub struct OracleNode<C: LedgerClient> {
    client: C,
    proposer: Box<dyn StatusProposer>,
    oracles: Vec<(AccountId, IndexTriple)>,
    broadcast: bool,
    cursor: u64,
    stats: NodeStats,
}

impl<C: LedgerClient> OracleNode<C> {
    pub fn new(client: C, proposer: Box<dyn StatusProposer>, broadcast: bool) -> Self {
        Self {
            client,
            proposer,
            oracles: Vec::new(),
            broadcast,
            cursor: 0,
            stats: NodeStats::default(),
        }
    }

    /// Register each account as an oracle, paying `fee` per account
    pub async fn register(
        &mut self,
        accounts: impl IntoIterator<Item = AccountId>,
        fee: Amount,
    ) -> NodeResult<()> {
        for account in accounts {
            let indexes = self.client.register_oracle(account, fee).await?;
            log::debug!("Oracle {:?} holds indexes {:?}", account, indexes.0);
            self.oracles.push((account, indexes));
        }
        log::info!("{} oracles registered", self.oracles.len());
        Ok(())
    }

    /// Answer for an oracle registered elsewhere
    pub async fn adopt(&mut self, account: AccountId) -> NodeResult<()> {
        let indexes = self.client.oracle_indexes(account).await?;
        self.oracles.push((account, indexes));
        Ok(())
    }

    pub fn oracles(&self) -> &[(AccountId, IndexTriple)] {
        &self.oracles
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Sequence number of the next event to read
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Read new events and answer every resolution request among them.
    /// Returns the number of responses the ledger accepted.
    pub async fn poll_once(&mut self) -> NodeResult<u64> {
        let events = self.client.events_since(self.cursor).await?;
        self.stats.polls += 1;

        let before = self.stats.responses_submitted;
        for sequenced in &events {
            self.cursor = sequenced.seq + 1;
            if let Some(request) = StatusRequest::from_event(&sequenced.event) {
                self.answer(&request).await;
            }
        }

        Ok(self.stats.responses_submitted - before)
    }

    async fn answer(&mut self, request: &StatusRequest) {
        self.stats.requests_seen += 1;

        for (oracle, indexes) in &self.oracles {
            if !self.broadcast && !indexes.contains(request.index) {
                continue;
            }

            let status = self.proposer.propose(request);
            let result = self
                .client
                .submit_oracle_response(
                    *oracle,
                    request.index,
                    request.airline,
                    &request.flight_number,
                    request.timestamp,
                    status,
                )
                .await;

            match result {
                Ok(outcome) => {
                    self.stats.responses_submitted += 1;
                    if let Some(status) = outcome.finalized {
                        self.stats.finalized += 1;
                        log::info!(
                            "Flight {} finalized as {}",
                            request.flight_number,
                            status
                        );
                    }
                }
                Err(err) if err.is_expected_oracle_rejection() => {
                    self.stats.responses_rejected += 1;
                    log::debug!("Response from {:?} not accepted: {}", oracle, err);
                }
                Err(err) => {
                    self.stats.errors += 1;
                    log::warn!(
                        "Response from {:?} for {} failed: {}",
                        oracle,
                        request.flight_number,
                        err
                    );
                }
            }
        }
    }

    /// Poll on a fixed interval until `shutdown` flips to true or its sender
    /// is dropped, then drain the log once more.
    pub async fn run(
        mut self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> NodeResult<NodeStats> {
        let mut ticker = time::interval(interval);
        log::info!("Oracle node polling every {:?}", interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.poll_once().await {
                        self.stats.errors += 1;
                        log::error!("Poll failed at cursor {}: {}", self.cursor, err);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.poll_once().await?;
        log::info!(
            "Oracle node stopped after {} polls: {} responses, {} finalized",
            self.stats.polls,
            self.stats.responses_submitted,
            self.stats.finalized
        );
        Ok(self.stats)
    }
}
