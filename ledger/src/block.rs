//! Blocks: immutable once sealed and appended.

use serde::{Deserialize, Serialize};
use std::fmt;

use notary_crypto::ContentHasher;
use notary_types::{Digest, Timestamp};
use notary_work::Difficulty;

use crate::encoding::{block_prefix, block_preimage};
use crate::genesis::GenesisPayload;
use crate::transaction::Transaction;

/// Link to the predecessor block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviousHash {
    /// Block 0 has no predecessor. Rendered as `"0"`.
    Sentinel,
    Block(Digest),
}

impl PreviousHash {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }
}

impl fmt::Display for PreviousHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentinel => f.write_str("0"),
            Self::Block(d) => write!(f, "{d}"),
        }
    }
}

/// What a block carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Block 0 only.
    Genesis(GenesisPayload),
    Transactions(Vec<Transaction>),
}

impl Payload {
    /// Transactions in this payload; empty for genesis.
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            Self::Genesis(_) => &[],
            Self::Transactions(txs) => txs,
        }
    }

    /// Entries counted by ledger statistics: the genesis payload counts as one.
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Genesis(_) => 1,
            Self::Transactions(txs) => txs.len(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis(_))
    }
}

/// A ledger block.
///
/// `hash` is the SHA-256 of the canonical encoding of every other field (see
/// [`crate::encoding`]). Only `nonce` changes after construction, during
/// mining, and [`Block::recompute_hash`] must follow every such change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: Timestamp,
    pub payload: Payload,
    pub previous_hash: PreviousHash,
    pub nonce: u64,
    pub hash: Digest,
}

impl Block {
    /// Build a block with nonce 0 and its hash computed.
    pub fn new(index: u64, timestamp: Timestamp, payload: Payload, previous_hash: PreviousHash) -> Self {
        let mut block = Self {
            index,
            timestamp,
            payload,
            previous_hash,
            nonce: 0,
            hash: Digest::ZERO,
        };
        block.recompute_hash();
        block
    }

    /// Hash of the block's current field values.
    pub fn compute_hash(&self) -> Digest {
        notary_crypto::digest(&block_preimage(
            self.index,
            self.timestamp,
            &self.payload,
            &self.previous_hash,
            self.nonce,
        ))
    }

    pub fn recompute_hash(&mut self) {
        self.hash = self.compute_hash();
    }

    /// Returns a function mapping a candidate nonce to the block hash that
    /// nonce would produce. The fixed field prefix is hashed once.
    pub fn nonce_hasher(&self) -> impl Fn(u64) -> Digest {
        let mut prefix = ContentHasher::new();
        prefix.update(&block_prefix(
            self.index,
            self.timestamp,
            &self.payload,
            &self.previous_hash,
        ));
        move |nonce| {
            let mut hasher = prefix.clone();
            hasher.update(&nonce.to_be_bytes());
            hasher.finalize()
        }
    }

    /// Set the nonce and refresh the hash.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.recompute_hash();
    }

    /// Whether the stored hash matches the fields.
    pub fn hash_is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn meets_difficulty(&self, difficulty: Difficulty) -> bool {
        difficulty.is_met_by(&self.hash)
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.payload.transactions()
    }

    pub fn is_genesis(&self) -> bool {
        self.payload.is_genesis()
    }
}
