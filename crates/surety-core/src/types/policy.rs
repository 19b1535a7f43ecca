//! Insurance policy identifiers and lifecycle states.

use std::fmt;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Sequential policy identifier, starting at 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PolicyId(pub u64);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "policy#{}", self.0)
    }
}

/// Policy lifecycle: ACTIVE -> CREDITED -> PAID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum PolicyState {
    #[default]
    Active,
    Credited,
    Paid,
}
