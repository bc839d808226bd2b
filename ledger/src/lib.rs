//! Single-writer, append-only notarization ledger.
//!
//! A chain of proof-of-work sealed blocks anchors file fingerprints and
//! carries a toy unit of account. Balances are never stored; they are
//! replayed from the block history. The whole ledger (blocks, mempool and
//! parameters) persists as one snapshot through [`notary_store::SnapshotStore`].

pub mod block;
pub mod encoding;
pub mod error;
pub mod genesis;
pub mod integrity;
pub mod ledger;
pub mod params;
pub mod render;
pub mod service;
pub mod snapshot;
pub mod transaction;

pub use block::{Block, Payload, PreviousHash};
pub use error::LedgerError;
pub use genesis::{create_genesis_block, GenesisConfig, GenesisPayload, Provenance};
pub use integrity::IntegrityError;
pub use ledger::{Candidate, Ledger, LedgerStats, MiningOutcome, NotarizationRecord};
pub use params::{LedgerParams, TransferCheck};
pub use render::render_chain;
pub use service::{Notary, Verification};
pub use snapshot::{SnapshotError, SNAPSHOT_VERSION};
pub use transaction::{Transaction, TxKind};
