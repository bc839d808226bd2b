//! The leading-zero difficulty predicate.

use serde::{Deserialize, Serialize};
use std::fmt;

use notary_types::Digest;

use crate::WorkError;

/// Required count of leading `'0'` characters in a sealed block's hex hash.
///
/// Expected work is `16^difficulty` hash evaluations.
///
/// Deserialization rejects values above [`Difficulty::MAX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32")]
pub struct Difficulty(u32);

impl Difficulty {
    /// Difficulty applied to new ledgers.
    pub const DEFAULT: Self = Self(4);

    /// Largest meaningful value: every hex character of a 256-bit hash.
    pub const MAX: Self = Self(Digest::HEX_LEN as u32);

    /// Create a difficulty, clamped to [`Difficulty::MAX`].
    pub fn new(zeros: u32) -> Self {
        Self(zeros.min(Self::MAX.0))
    }

    pub fn zeros(&self) -> u32 {
        self.0
    }

    /// Whether `hash` starts with at least `self.zeros()` hex zeros.
    pub fn is_met_by(&self, hash: &Digest) -> bool {
        hash.leading_zero_nibbles() >= self.0
    }

    /// The hex prefix a sealed hash must carry.
    pub fn prefix(&self) -> String {
        "0".repeat(self.0 as usize)
    }

}

impl TryFrom<u32> for Difficulty {
    type Error = WorkError;

    fn try_from(zeros: u32) -> Result<Self, Self::Error> {
        if zeros > Self::MAX.0 {
            return Err(WorkError::DifficultyOutOfRange {
                zeros,
                max: Self::MAX.0,
            });
        }
        Ok(Self(zeros))
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
