//! Fixed-size content digest used for file fingerprints and block hashes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypeError;

/// A 32-byte (256-bit) content digest.
///
/// Rendered as 64 lowercase hex characters, which is also the form the
/// difficulty predicate inspects.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Default for Digest {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Digest {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 64;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First `len` characters of the hex rendering.
    pub fn short_hex(&self, len: usize) -> String {
        let mut s = self.to_hex();
        s.truncate(len.min(Self::HEX_LEN));
        s
    }

    /// Number of leading `'0'` characters in the hex rendering.
    ///
    /// Each byte contributes two nibbles, so this is computed from the raw
    /// bytes without allocating.
    pub fn leading_zero_nibbles(&self) -> u32 {
        let mut count = 0;
        for byte in &self.0 {
            if *byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}\u{2026})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidDigest(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(trimmed, &mut bytes)
            .map_err(|_| TypeError::InvalidDigest(s.to_string()))?;
        Ok(Self(bytes))
    }
}
