//! # Core Types
//!
//! Identifiers and value types shared by every ledger component.

pub mod account;
pub mod flight;
pub mod oracle;
pub mod policy;

pub use account::*;
pub use flight::*;
pub use oracle::*;
pub use policy::*;
