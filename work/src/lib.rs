//! Proof-of-work block sealing.
//!
//! Not consensus: a deliberate computational cost. A block is sealed when the
//! hex rendering of its hash starts with `difficulty` `'0'` characters. The
//! search walks a single nonce stream upward from a starting point and can be
//! stepped with a budget, cancelled, and resumed without changing the result.

pub mod difficulty;
pub mod error;
pub mod search;

pub use difficulty::Difficulty;
pub use error::WorkError;
pub use search::{NonceSearch, SearchControl, SearchStep, Solution};
