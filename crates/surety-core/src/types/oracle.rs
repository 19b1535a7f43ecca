//! Oracle index assignments and request keys.

use crate::constants::INDEXES_PER_ORACLE;
use crate::types::{FlightKey, StatusCode};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// The three indexes assigned to an oracle at registration.
/// Values may repeat; the assignment is fixed for the oracle's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct IndexTriple(pub [u8; INDEXES_PER_ORACLE]);

impl IndexTriple {
    pub fn contains(&self, index: u8) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Indexes with duplicates removed, in assignment order
    pub fn distinct(&self) -> Vec<u8> {
        let mut seen = Vec::with_capacity(INDEXES_PER_ORACLE);
        for index in self.iter() {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
        seen
    }
}

/// Key of one status resolution request: the flight plus the drawn index.
/// Ordered by flight first so all requests for a flight are contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct RequestKey {
    pub flight: FlightKey,
    pub index: u8,
}

impl RequestKey {
    pub fn new(flight: FlightKey, index: u8) -> Self {
        Self { flight, index }
    }
}

/// Result of a recorded oracle response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct ResponseOutcome {
    pub request: RequestKey,
    /// Matching responses for the submitted status so far
    pub matching: u32,
    /// Set only on the response that reached quorum
    pub finalized: Option<StatusCode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_triple_membership() {
        let triple = IndexTriple([1, 4, 4]);
        assert!(triple.contains(1));
        assert!(triple.contains(4));
        assert!(!triple.contains(2));
        assert_eq!(triple.distinct(), vec![1, 4]);
    }

    #[test]
    fn test_request_keys_group_by_flight() {
        let a = FlightKey([1; 32]);
        let b = FlightKey([2; 32]);
        assert!(RequestKey::new(a, 9) < RequestKey::new(b, 0));
        assert!(RequestKey::new(a, 0) < RequestKey::new(a, 9));
    }
}
