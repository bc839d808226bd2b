//! Fundamental types for the notary ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! content digests, addresses, amounts and timestamps.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use error::TypeError;
pub use hash::Digest;
pub use time::{Clock, SystemClock, Timestamp};
