use notary_crypto::HashError;
use notary_types::{Address, Amount};
use notary_work::WorkError;
use thiserror::Error;

use crate::{IntegrityError, SnapshotError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient funds: {address} has {available}, tried to send {requested}")]
    InsufficientFunds {
        address: Address,
        available: i64,
        requested: Amount,
    },

    #[error("candidate block is stale: {reason}")]
    StaleCandidate { reason: String },

    #[error("candidate block has not been sealed")]
    Unsealed,

    #[error("hashing failed: {0}")]
    Hash(#[from] HashError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("proof-of-work error: {0}")]
    Work(#[from] WorkError),

    #[error("chain integrity violated: {0}")]
    Integrity(#[from] IntegrityError),
}
