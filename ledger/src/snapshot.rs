//! Ledger snapshots: the whole ledger as one checksummed blob.
//!
//! Layout:
//!
//! ```text
//! magic     "NTRY"
//! version   u32 BE
//! checksum  Blake2b-256 of body
//! body      bincode(Ledger)
//! ```
//!
//! A missing snapshot creates a fresh chain. A snapshot that fails any check
//! is an error; a corrupt file is never replaced by a new genesis.

use thiserror::Error;
use tracing::{debug, info};

use notary_store::{SnapshotStore, StoreError};
use notary_types::Clock;

use crate::genesis::GenesisConfig;
use crate::integrity::IntegrityError;
use crate::ledger::Ledger;
use crate::params::LedgerParams;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

const MAGIC: &[u8; 4] = b"NTRY";
const HEADER_LEN: usize = 4 + 4 + 32;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("snapshot failed integrity check: {0}")]
    Integrity(#[from] IntegrityError),
}

/// Serialize a ledger into the snapshot envelope.
pub fn encode(ledger: &Ledger) -> Result<Vec<u8>, SnapshotError> {
    let body = bincode::serialize(ledger).map_err(|e| SnapshotError::Encode(e.to_string()))?;
    let checksum = notary_crypto::blake2b_256(&body);

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&SNAPSHOT_VERSION.to_be_bytes());
    out.extend_from_slice(&checksum);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Parse a snapshot envelope and run the integrity check on the result.
pub fn decode(bytes: &[u8]) -> Result<Ledger, SnapshotError> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Corrupt(format!("truncated: {} bytes", bytes.len())));
    }
    let (magic, rest) = bytes.split_at(4);
    if magic != MAGIC {
        return Err(SnapshotError::Corrupt("bad magic".into()));
    }
    let (version, rest) = rest.split_at(4);
    let mut version_bytes = [0u8; 4];
    version_bytes.copy_from_slice(version);
    let version = u32::from_be_bytes(version_bytes);
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Corrupt(format!("unsupported version {version}")));
    }
    let (checksum, body) = rest.split_at(32);
    if notary_crypto::blake2b_256(body).as_slice() != checksum {
        return Err(SnapshotError::Corrupt("checksum mismatch".into()));
    }
    let ledger: Ledger = bincode::deserialize(body).map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
    ledger.verify_integrity()?;
    Ok(ledger)
}

impl Ledger {
    /// Load and verify a ledger. `Ok(None)` when nothing has been stored.
    pub fn load<S: SnapshotStore>(store: &S) -> Result<Option<Self>, SnapshotError> {
        let Some(bytes) = store.load()? else {
            return Ok(None);
        };
        let ledger = decode(&bytes)?;
        debug!(
            bytes = bytes.len(),
            height = ledger.blocks.len(),
            pending = ledger.mempool.len(),
            "snapshot loaded"
        );
        Ok(Some(ledger))
    }

    pub fn persist<S: SnapshotStore>(&self, store: &S) -> Result<(), SnapshotError> {
        let bytes = encode(self)?;
        store.save(&bytes)?;
        debug!(bytes = bytes.len(), height = self.blocks.len(), "snapshot saved");
        Ok(())
    }

    /// Load the stored ledger, or build a fresh one if the store is empty.
    ///
    /// The flag is `true` when the ledger was freshly created and has not
    /// been persisted yet. `params` and `genesis` only apply to a new chain.
    pub fn open_or_create<S: SnapshotStore, C: Clock>(
        store: &S,
        params: LedgerParams,
        genesis: &GenesisConfig,
        clock: &C,
    ) -> Result<(Self, bool), SnapshotError> {
        match Self::load(store)? {
            Some(ledger) => Ok((ledger, false)),
            None => {
                info!("no snapshot found, creating new chain");
                Ok((Self::new(params, genesis, clock.now()), true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Payload;
    use crate::transaction::Transaction;
    use notary_nullables::{NullClock, NullSnapshotStore};
    use notary_types::{Address, Amount, Timestamp};
    use notary_work::Difficulty;

    fn sample() -> Ledger {
        let params = LedgerParams::default().with_difficulty(Difficulty::new(1));
        let mut ledger = Ledger::new(params, &GenesisConfig::default(), Timestamp::new(50));
        ledger.admit(Transaction::currency(
            Address::new("Alice"),
            Address::new("Bob"),
            Amount::new(5),
            Timestamp::new(51),
        ));
        ledger.mine(&Address::new("m"), None, Timestamp::new(52)).unwrap();
        ledger.admit(Transaction::notarization(
            Address::new("Alice"),
            notary_types::Digest::new([3; 32]),
            "doc.pdf",
            Timestamp::new(53),
        ));
        ledger
    }

    #[test]
    fn round_trip_is_exact() {
        let ledger = sample();
        let decoded = decode(&encode(&ledger).unwrap()).unwrap();
        assert_eq!(decoded, ledger);
    }

    #[test]
    fn bad_magic_is_corrupt() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn unknown_version_is_corrupt() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[4..8].copy_from_slice(&99u32.to_be_bytes());
        assert!(matches!(decode(&bytes), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn flipped_body_byte_fails_checksum() {
        let mut bytes = encode(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode(&bytes), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn truncated_is_corrupt() {
        assert!(matches!(decode(b"NTRY"), Err(SnapshotError::Corrupt(_))));
        assert!(matches!(decode(&[]), Err(SnapshotError::Corrupt(_))));
    }

    /// Rebuild the envelope around `body` with a valid checksum.
    fn envelope(body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&SNAPSHOT_VERSION.to_be_bytes());
        out.extend_from_slice(&notary_crypto::blake2b_256(body));
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn difficulty_beyond_hash_width_is_corrupt() {
        let genesis_only = |zeros| {
            let params = LedgerParams::default().with_difficulty(Difficulty::new(zeros));
            Ledger::new(params, &GenesisConfig::default(), Timestamp::new(50))
        };
        let ledger = genesis_only(1);
        let body = bincode::serialize(&ledger).unwrap();

        // Locate the difficulty byte by diffing params that differ only there.
        let params_at_one = bincode::serialize(ledger.params()).unwrap();
        let params_at_two = bincode::serialize(genesis_only(2).params()).unwrap();
        let offset = params_at_one
            .iter()
            .zip(&params_at_two)
            .position(|(a, b)| a != b)
            .unwrap();
        let start = body
            .windows(params_at_one.len())
            .position(|w| w == params_at_one.as_slice())
            .unwrap();

        let mut tampered = body.clone();
        tampered[start + offset] = 200;
        assert!(matches!(decode(&envelope(&tampered)), Err(SnapshotError::Corrupt(_))));

        tampered[start + offset] = 64;
        assert_eq!(decode(&envelope(&tampered)).unwrap().params().difficulty, Difficulty::MAX);
    }

    #[test]
    fn decode_rejects_chain_without_genesis() {
        let mut ledger = sample();
        ledger.blocks.clear();
        let bytes = encode(&ledger).unwrap();
        assert!(matches!(
            decode(&bytes),
            Err(SnapshotError::Integrity(IntegrityError::MissingGenesis))
        ));
    }

    #[test]
    fn load_runs_integrity_check() {
        let mut ledger = sample();
        if let Payload::Transactions(txs) = &mut ledger.blocks[1].payload {
            txs.clear();
        }
        let store = NullSnapshotStore::with_bytes(encode(&ledger).unwrap());
        assert!(matches!(Ledger::load(&store), Err(SnapshotError::Integrity(_))));
    }

    #[test]
    fn open_or_create_on_empty_store() {
        let store = NullSnapshotStore::new();
        let clock = NullClock::new(1_234);
        let (ledger, created) =
            Ledger::open_or_create(&store, LedgerParams::default(), &GenesisConfig::default(), &clock).unwrap();
        assert!(created);
        assert_eq!(ledger.blocks().len(), 1);
        assert_eq!(ledger.tip().timestamp, Timestamp::new(1_234));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn open_or_create_keeps_stored_params() {
        let store = NullSnapshotStore::new();
        let ledger = sample();
        ledger.persist(&store).unwrap();
        let other = LedgerParams::default().with_unit_name("Other");
        let (loaded, created) =
            Ledger::open_or_create(&store, other, &GenesisConfig::default(), &NullClock::new(0)).unwrap();
        assert!(!created);
        assert_eq!(loaded, ledger);
    }

    #[test]
    fn corrupt_store_is_not_replaced() {
        let store = NullSnapshotStore::with_bytes(b"garbage".to_vec());
        let result = Ledger::open_or_create(&store, LedgerParams::default(), &GenesisConfig::default(), &NullClock::new(0));
        assert!(matches!(result, Err(SnapshotError::Corrupt(_))));
        assert_eq!(store.bytes(), Some(b"garbage".to_vec()));
    }
}
