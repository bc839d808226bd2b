//! Unit-of-account amounts.
//!
//! Amounts are non-negative integers. Balances derived from replay are signed
//! (`i64`), so conversion saturates at `i64::MAX`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative quantity of the ledger's unit of account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Signed view used by balance replay.
    pub fn as_signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
