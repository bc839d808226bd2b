//! Canonical block encoding.
//!
//! Block hashes are computed over a fixed-order, type-tagged binary encoding
//! so the same logical content always produces the same bytes:
//!
//! ```text
//! "notary-block-v1"
//! index        u64 BE
//! timestamp    u64 BE
//! payload      0x00 genesis { message: str, provenance: option<{repo_url: str, commit_hash: str}> }
//!              0x01 transactions { count: u32 BE, tx* }
//! previous     0x00 sentinel | 0x01 digest[32]
//! nonce        u64 BE
//!
//! tx           0x01 notarization { owner: str, file_hash[32], filename: str, timestamp u64 }
//!              0x02 reward       { recipient: str, amount u64 }
//!              0x03 currency     { sender: str, recipient: str, amount u64, timestamp u64 }
//! str          len u32 BE, UTF-8 bytes
//! option<T>    0x00 | 0x01 T
//! ```
//!
//! The nonce is the final field, so a miner can hash the fixed prefix once
//! and only feed the nonce bytes per attempt.

use notary_types::{Digest, Timestamp};

use crate::block::{Payload, PreviousHash};
use crate::genesis::GenesisPayload;
use crate::transaction::Transaction;

/// Domain separator at the start of every block encoding.
pub const BLOCK_DOMAIN: &[u8] = b"notary-block-v1";

const PAYLOAD_GENESIS: u8 = 0x00;
const PAYLOAD_TRANSACTIONS: u8 = 0x01;

const PREVIOUS_SENTINEL: u8 = 0x00;
const PREVIOUS_BLOCK: u8 = 0x01;

const TX_NOTARIZATION: u8 = 0x01;
const TX_REWARD: u8 = 0x02;
const TX_CURRENCY: u8 = 0x03;

/// Append-only byte writer for the canonical encoding.
#[derive(Default)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    pub fn put_str(&mut self, s: &str) {
        // Length saturates at u32::MAX.
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.put_u32(len);
        self.put_bytes(s.as_bytes());
    }

    pub fn put_digest(&mut self, d: &Digest) {
        self.put_bytes(d.as_bytes());
    }

    pub fn put_timestamp(&mut self, t: Timestamp) {
        self.put_u64(t.as_secs());
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Types with a canonical encoding.
pub trait Encode {
    fn encode(&self, enc: &mut CanonicalEncoder);
}

impl Encode for Transaction {
    fn encode(&self, enc: &mut CanonicalEncoder) {
        match self {
            Transaction::Notarization {
                owner,
                file_hash,
                filename,
                timestamp,
            } => {
                enc.put_u8(TX_NOTARIZATION);
                enc.put_str(owner.as_str());
                enc.put_digest(file_hash);
                enc.put_str(filename);
                enc.put_timestamp(*timestamp);
            }
            Transaction::Reward { recipient, amount } => {
                enc.put_u8(TX_REWARD);
                enc.put_str(recipient.as_str());
                enc.put_u64(amount.raw());
            }
            Transaction::Currency {
                sender,
                recipient,
                amount,
                timestamp,
            } => {
                enc.put_u8(TX_CURRENCY);
                enc.put_str(sender.as_str());
                enc.put_str(recipient.as_str());
                enc.put_u64(amount.raw());
                enc.put_timestamp(*timestamp);
            }
        }
    }
}

impl Encode for GenesisPayload {
    fn encode(&self, enc: &mut CanonicalEncoder) {
        enc.put_str(&self.message);
        match &self.provenance {
            None => enc.put_u8(0x00),
            Some(p) => {
                enc.put_u8(0x01);
                enc.put_str(&p.repo_url);
                enc.put_str(&p.commit_hash);
            }
        }
    }
}

impl Encode for Payload {
    fn encode(&self, enc: &mut CanonicalEncoder) {
        match self {
            Payload::Genesis(genesis) => {
                enc.put_u8(PAYLOAD_GENESIS);
                genesis.encode(enc);
            }
            Payload::Transactions(txs) => {
                enc.put_u8(PAYLOAD_TRANSACTIONS);
                enc.put_u32(u32::try_from(txs.len()).unwrap_or(u32::MAX));
                for tx in txs {
                    tx.encode(enc);
                }
            }
        }
    }
}

impl Encode for PreviousHash {
    fn encode(&self, enc: &mut CanonicalEncoder) {
        match self {
            PreviousHash::Sentinel => enc.put_u8(PREVIOUS_SENTINEL),
            PreviousHash::Block(d) => {
                enc.put_u8(PREVIOUS_BLOCK);
                enc.put_digest(d);
            }
        }
    }
}

/// Encoding of every block field except the trailing nonce.
pub fn block_prefix(index: u64, timestamp: Timestamp, payload: &Payload, previous: &PreviousHash) -> Vec<u8> {
    let mut enc = CanonicalEncoder::new();
    enc.put_bytes(BLOCK_DOMAIN);
    enc.put_u64(index);
    enc.put_timestamp(timestamp);
    payload.encode(&mut enc);
    previous.encode(&mut enc);
    enc.finish()
}

/// Full canonical encoding of a block's hashed fields.
pub fn block_preimage(
    index: u64,
    timestamp: Timestamp,
    payload: &Payload,
    previous: &PreviousHash,
    nonce: u64,
) -> Vec<u8> {
    let mut bytes = block_prefix(index, timestamp, payload, previous);
    bytes.extend_from_slice(&nonce.to_be_bytes());
    bytes
}
