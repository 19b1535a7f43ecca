//! Ledger access seam for the oracle node

use std::sync::Arc;

use async_trait::async_trait;
use flight_surety_core::{
    AccountId, Amount, IndexTriple, Ledger, Receipt, ResponseOutcome, SequencedEvent, StatusCode,
    SuretyResult,
};
use tokio::sync::Mutex;

/// Calls the oracle node makes against the ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn register_oracle(&self, account: AccountId, fee: Amount) -> SuretyResult<IndexTriple>;

    async fn oracle_indexes(&self, account: AccountId) -> SuretyResult<IndexTriple>;

    #[allow(clippy::too_many_arguments)]
    async fn submit_oracle_response(
        &self,
        oracle: AccountId,
        index: u8,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
        status: StatusCode,
    ) -> SuretyResult<ResponseOutcome>;

    async fn events_since(&self, cursor: u64) -> SuretyResult<Vec<SequencedEvent>>;
}

/// Ledger living in the same process, shared behind an async mutex.
/// Holding the lock for a whole call keeps transactions serialized.
#[derive(Clone)]
pub struct InProcessLedger {
    ledger: Arc<Mutex<Ledger>>,
}

impl InProcessLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Handle for drivers that issue non-oracle calls on the same ledger
    pub fn shared(&self) -> Arc<Mutex<Ledger>> {
        Arc::clone(&self.ledger)
    }
}

#[async_trait]
impl LedgerClient for InProcessLedger {
    async fn register_oracle(&self, account: AccountId, fee: Amount) -> SuretyResult<IndexTriple> {
        let mut ledger = self.ledger.lock().await;
        ledger.register_oracle(account, fee).map(Receipt::into_value)
    }

    async fn oracle_indexes(&self, account: AccountId) -> SuretyResult<IndexTriple> {
        self.ledger.lock().await.oracle_indexes(&account)
    }

    async fn submit_oracle_response(
        &self,
        oracle: AccountId,
        index: u8,
        airline: AccountId,
        flight_number: &str,
        timestamp: i64,
        status: StatusCode,
    ) -> SuretyResult<ResponseOutcome> {
        let mut ledger = self.ledger.lock().await;
        ledger
            .submit_oracle_response(oracle, index, airline, flight_number, timestamp, status)
            .map(Receipt::into_value)
    }

    async fn events_since(&self, cursor: u64) -> SuretyResult<Vec<SequencedEvent>> {
        Ok(self.ledger.lock().await.events_since(cursor).to_vec())
    }
}
