//! # Event Log
//!
//! Append-only, sequenced log of domain events. A transaction's events are
//! appended together only when the transaction succeeds, and are also
//! returned to the caller in its [`Receipt`].

use crate::types::*;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Notifications observed by the client and watcher collaborators
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum LedgerEvent {
    OperationalStateChanged {
        operational: bool,
    },

    /// Result of one nomination or vote
    AdmissionOutcome {
        airline: AccountId,
        admitted: bool,
        votes_still_needed: u32,
        awaiting_fee: bool,
    },

    AirlineRegistered {
        airline: AccountId,
        registered_count: u32,
    },

    AirlineFeePaid {
        airline: AccountId,
        amount: Amount,
    },

    FlightRegistered {
        key: FlightKey,
        airline: AccountId,
        flight_number: String,
        departure_time: i64,
    },

    OracleRegistered {
        oracle: AccountId,
        indexes: IndexTriple,
    },

    /// Watchers key off this to decide which oracles should answer
    StatusResolutionRequested {
        index: u8,
        airline: AccountId,
        flight_number: String,
        timestamp: i64,
    },

    OracleResponseRecorded {
        index: u8,
        airline: AccountId,
        flight_number: String,
        timestamp: i64,
        oracle: AccountId,
        status: StatusCode,
    },

    FlightStatusFinalized {
        key: FlightKey,
        status: StatusCode,
    },

    InsurancePurchased {
        policy: PolicyId,
        passenger: AccountId,
        flight: FlightKey,
        amount: Amount,
    },

    PolicyCredited {
        policy: PolicyId,
        passenger: AccountId,
        credit: Amount,
    },

    CreditWithdrawn {
        passenger: AccountId,
        amount: Amount,
    },

    /// The payout transfer failed; the withdrawn credit is owed again
    WithdrawalReverted {
        passenger: AccountId,
        amount: Amount,
    },
}

/// An event with its position in the log
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SequencedEvent {
    pub seq: u64,
    pub event: LedgerEvent,
}

/// Value returned by a successful transaction, with the events it emitted
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct Receipt<T> {
    pub value: T,
    pub events: Vec<SequencedEvent>,
}

impl<T> Receipt<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Vec<SequencedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction's events and return them with their sequence numbers
    pub(crate) fn append(&mut self, events: Vec<LedgerEvent>) -> Vec<SequencedEvent> {
        let start = self.entries.len() as u64;
        let sequenced: Vec<SequencedEvent> = events
            .into_iter()
            .enumerate()
            .map(|(offset, event)| SequencedEvent {
                seq: start + offset as u64,
                event,
            })
            .collect();
        self.entries.extend(sequenced.iter().cloned());
        sequenced
    }

    /// Events with `seq >= cursor`
    pub fn since(&self, cursor: u64) -> &[SequencedEvent] {
        let start = (cursor as usize).min(self.entries.len());
        &self.entries[start..]
    }

    /// Sequence number the next event will receive
    pub fn next_seq(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_sequence_numbers() {
        let mut log = EventLog::new();
        let first = log.append(vec![LedgerEvent::OperationalStateChanged {
            operational: false,
        }]);
        let second = log.append(vec![
            LedgerEvent::OperationalStateChanged { operational: true },
            LedgerEvent::OperationalStateChanged { operational: false },
        ]);

        assert_eq!(first[0].seq, 0);
        assert_eq!(second[0].seq, 1);
        assert_eq!(second[1].seq, 2);
        assert_eq!(log.next_seq(), 3);
    }

    #[test]
    fn test_since_cursor() {
        let mut log = EventLog::new();
        log.append(vec![
            LedgerEvent::OperationalStateChanged { operational: true };
            4
        ]);

        assert_eq!(log.since(0).len(), 4);
        assert_eq!(log.since(3).len(), 1);
        assert_eq!(log.since(3)[0].seq, 3);
        assert!(log.since(10).is_empty());
    }
}
